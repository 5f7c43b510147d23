//! Host runtime ABI targeted by the lowering.
//!
//! Every call the pass emits goes to one of the [`RuntimeSymbol`] entry points.
//! The runtime handle returned by `initVulkan` is threaded through all of them.
//!
//! ```text
//! initVulkan() -> R
//! createVulkanLaunchKernelAction(R, spirv_ptr, spirv_size, entry_ptr, gx, gy, gz)
//! bindBuffer<T>(R, set, binding, byte_size, copy_mode, buffer<*xT>)
//! setVulkanLaunchKernelAction(R, subgroup_size)
//! createVulkanMemoryTransferAction(R, src_launch, src_binding, dst_launch, dst_binding)
//! addVulkanLaunchActionToSchedule(R)
//! run(R)
//! deinitVulkan(R)
//! ```

use enumset::EnumSet;
use lumen_dtype::{DType, ScalarDType};
use lumen_ir::Signature;

/// Placeholder callee marking where a launch's buffers get bound once the
/// whole launch sequence is known.
pub const BIND_ALL_BUFFERS: &str = "bindAllBuffers";

/// Prefix of the internal globals holding serialized shader binaries.
pub const SPIRV_BINARY_PREFIX: &str = "SPIRV_BIN";

/// Suffix of the internal globals holding entry point names.
pub const ENTRY_POINT_NAME_SUFFIX: &str = "_spv_entry_point_name";

/// Descriptor set every buffer is bound to.
pub const DESCRIPTOR_SET: i32 = 0;

/// Runtime entry points.
#[derive(Debug, Hash, PartialOrd, Ord)]
#[derive(strum::EnumIter, strum::IntoStaticStr, strum::EnumString, strum::Display)]
#[derive(enumset::EnumSetType)]
pub enum RuntimeSymbol {
    #[strum(serialize = "initVulkan")]
    Init,
    #[strum(serialize = "createVulkanLaunchKernelAction")]
    CreateLaunchAction,
    #[strum(serialize = "setVulkanLaunchKernelAction")]
    SetLaunchAction,
    #[strum(serialize = "addVulkanLaunchActionToSchedule")]
    AddLaunchActionToSchedule,
    #[strum(serialize = "run")]
    Run,
    #[strum(serialize = "deinitVulkan")]
    Deinit,

    // Optional entry points, declared only when referenced.
    #[strum(serialize = "createVulkanMemoryTransferAction")]
    CreateMemoryTransferAction,
    #[strum(serialize = "print_memref_f32")]
    PrintBufferF32,

    // Signless: valid for both signed and unsigned integers.
    #[strum(serialize = "bindBufferInteger8")]
    BindBufferInteger8,
    #[strum(serialize = "bindBufferInteger16")]
    BindBufferInteger16,
    #[strum(serialize = "bindBufferInteger32")]
    BindBufferInteger32,
    #[strum(serialize = "bindBufferInteger64")]
    BindBufferInteger64,
    #[strum(serialize = "bindBufferBFloat16")]
    BindBufferBFloat16,
    #[strum(serialize = "bindBufferFloat16")]
    BindBufferFloat16,
    #[strum(serialize = "bindBufferFloat32")]
    BindBufferFloat32,
    #[strum(serialize = "bindBufferFloat64")]
    BindBufferFloat64,
}

/// Set of runtime entry points referenced by emitted calls.
pub type SymbolUsage = EnumSet<RuntimeSymbol>;

impl RuntimeSymbol {
    /// Entry points declared regardless of usage.
    pub const FIXED: [Self; 6] = [
        Self::Init,
        Self::CreateLaunchAction,
        Self::SetLaunchAction,
        Self::AddLaunchActionToSchedule,
        Self::Run,
        Self::Deinit,
    ];

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn is_optional(self) -> bool {
        !Self::FIXED.contains(&self)
    }

    /// Typed buffer binding entry point for an element type.
    pub fn bind_buffer(scalar: ScalarDType) -> Option<Self> {
        use ScalarDType::*;
        Some(match scalar {
            Int8 | UInt8 => Self::BindBufferInteger8,
            Int16 | UInt16 => Self::BindBufferInteger16,
            Int32 | UInt32 => Self::BindBufferInteger32,
            Int64 | UInt64 => Self::BindBufferInteger64,
            BFloat16 => Self::BindBufferBFloat16,
            Float16 => Self::BindBufferFloat16,
            Float32 => Self::BindBufferFloat32,
            Float64 => Self::BindBufferFloat64,
            Bool | Void | Index => return None,
        })
    }

    /// Element type accepted by a typed binding entry point.
    ///
    /// Integer bindings are signless; the signed type stands for the width.
    pub fn bound_element(self) -> Option<ScalarDType> {
        Some(match self {
            Self::BindBufferInteger8 => ScalarDType::Int8,
            Self::BindBufferInteger16 => ScalarDType::Int16,
            Self::BindBufferInteger32 => ScalarDType::Int32,
            Self::BindBufferInteger64 => ScalarDType::Int64,
            Self::BindBufferBFloat16 => ScalarDType::BFloat16,
            Self::BindBufferFloat16 => ScalarDType::Float16,
            Self::BindBufferFloat32 => ScalarDType::Float32,
            Self::BindBufferFloat64 => ScalarDType::Float64,
            _ => return None,
        })
    }

    /// Declared signature of the entry point.
    pub fn signature(self) -> Signature {
        let ptr = || DType::Ptr;
        match self {
            Self::Init => Signature::new([], [ptr()]),
            Self::CreateLaunchAction => Signature::new(
                [ptr(), ptr(), DType::Int32, ptr(), DType::Int32, DType::Int32, DType::Int32],
                [],
            ),
            Self::SetLaunchAction => Signature::new([ptr(), DType::Int32], []),
            Self::AddLaunchActionToSchedule | Self::Run | Self::Deinit => Signature::new([ptr()], []),
            Self::CreateMemoryTransferAction => {
                Signature::new([ptr(), DType::Int64, DType::Int64, DType::Int64, DType::Int64], [])
            }
            Self::PrintBufferF32 => Signature::new([DType::UnrankedBuffer { scalar: ScalarDType::Float32 }], []),
            bind => {
                let scalar = bind.bound_element().unwrap_or(ScalarDType::Void);
                Signature::new(
                    [
                        ptr(),
                        DType::Int32,
                        DType::Int32,
                        DType::Int32,
                        DType::Int32,
                        DType::UnrankedBuffer { scalar },
                    ],
                    [],
                )
            }
        }
    }
}
