mod program;
mod spirv;
