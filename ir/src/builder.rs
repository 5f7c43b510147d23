//! Insertion-point builder for host IR operations.
//!
//! Operations created through one builder keep their creation order: with an
//! [`InsertPoint::Before`] anchor every new operation lands right before the
//! anchor, after the ones created earlier.

use lumen_dtype::ext::HasDType;
use lumen_dtype::{DType, ScalarDType};
use smallvec::{SmallVec, smallvec};
use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::function::{Function, InsertPoint};
use crate::op::{LaunchFunc, Op};
use crate::types::{BlockId, ConstValue, KernelRef, OpId, ValueId};

pub struct OpBuilder<'f> {
    func: &'f mut Function,
    at: InsertPoint,
    /// Last known index of the `Before` anchor.
    anchor_index: Option<usize>,
}

impl<'f> OpBuilder<'f> {
    /// Builder inserting right before `anchor`.
    pub fn before(func: &'f mut Function, anchor: OpId) -> Self {
        Self { func, at: InsertPoint::Before(anchor), anchor_index: None }
    }

    /// Builder appending to the end of `block`.
    pub fn at_end(func: &'f mut Function, block: BlockId) -> Self {
        Self { func, at: InsertPoint::BlockEnd(block), anchor_index: None }
    }

    pub fn set_insertion_point(&mut self, at: InsertPoint) {
        self.at = at;
        self.anchor_index = None;
    }

    pub fn insertion_point(&self) -> InsertPoint {
        self.at
    }

    pub fn func(&self) -> &Function {
        &*self.func
    }

    pub fn func_mut(&mut self) -> &mut Function {
        &mut *self.func
    }

    /// Create an operation with the given result types.
    pub fn create(&mut self, op: Op, result_types: impl IntoIterator<Item = DType>) -> Result<OpId> {
        self.insert(op, result_types.into_iter().collect())
    }

    /// Create a single-result operation and return its value.
    pub fn create_value(&mut self, op: Op, dtype: DType) -> Result<ValueId> {
        let id = self.insert(op, smallvec![dtype])?;
        self.func.op(id)?.result().context(UnknownOpSnafu { op: id })
    }

    fn insert(&mut self, op: Op, result_types: SmallVec<[DType; 1]>) -> Result<OpId> {
        let (id, index) = self.func.insert(op, result_types, self.at, self.anchor_index)?;
        if let InsertPoint::Before(_) = self.at {
            // The anchor now sits right after the new operation.
            self.anchor_index = Some(index + 1);
        }
        Ok(id)
    }

    // =========================================================================
    // Constants and symbols
    // =========================================================================

    pub fn constant(&mut self, value: impl Into<ConstValue>, dtype: ScalarDType) -> Result<ValueId> {
        self.create_value(Op::Const(value.into()), DType::Scalar(dtype))
    }

    /// Constant typed after its native Rust type.
    pub fn native_const<T: HasDType + Into<ConstValue>>(&mut self, value: T) -> Result<ValueId> {
        self.constant(value, T::DTYPE)
    }

    pub fn index_const(&mut self, value: i64) -> Result<ValueId> {
        self.constant(value, ScalarDType::Index)
    }

    pub fn address_of(&mut self, global: impl Into<String>) -> Result<ValueId> {
        self.create_value(Op::AddressOf { global: global.into() }, DType::Ptr)
    }

    // =========================================================================
    // Host memory
    // =========================================================================

    pub fn alloc(&mut self, dtype: DType) -> Result<ValueId> {
        ensure!(dtype.is_buffer(), ExpectedBufferSnafu { dtype });
        self.create_value(Op::Alloc, dtype)
    }

    pub fn dealloc(&mut self, buffer: ValueId) -> Result<OpId> {
        self.create(Op::Dealloc { buffer }, [])
    }

    pub fn load(&mut self, buffer: ValueId, indices: &[ValueId]) -> Result<ValueId> {
        let dtype = self.buffer_type(buffer)?;
        let scalar = dtype.element().context(ExpectedBufferSnafu { dtype: dtype.clone() })?;
        self.create_value(Op::Load { buffer, indices: indices.into() }, DType::Scalar(scalar))
    }

    pub fn store(&mut self, value: ValueId, buffer: ValueId, indices: &[ValueId]) -> Result<OpId> {
        self.buffer_type(buffer)?;
        self.create(Op::Store { value, buffer, indices: indices.into() }, [])
    }

    /// Cast a ranked buffer to its unranked form.
    pub fn cast_unranked(&mut self, src: ValueId) -> Result<ValueId> {
        let dtype = self.buffer_type(src)?;
        self.create_value(Op::Cast { src }, dtype.unranked())
    }

    fn buffer_type(&self, buffer: ValueId) -> Result<DType> {
        let dtype = self.func.value_type(buffer)?;
        ensure!(dtype.is_buffer(), ExpectedBufferSnafu { dtype: dtype.clone() });
        Ok(dtype.clone())
    }

    // =========================================================================
    // Calls and launches
    // =========================================================================

    pub fn call(
        &mut self,
        callee: impl Into<String>,
        args: &[ValueId],
        result_types: impl IntoIterator<Item = DType>,
    ) -> Result<OpId> {
        self.create(Op::Call { callee: callee.into(), args: args.into() }, result_types)
    }

    pub fn launch(
        &mut self,
        kernel: KernelRef,
        grid: [ValueId; 3],
        block: [ValueId; 3],
        args: &[ValueId],
    ) -> Result<OpId> {
        self.create(Op::LaunchFunc(LaunchFunc { kernel, grid, block, args: args.into() }), [])
    }

    // =========================================================================
    // Terminators
    // =========================================================================

    pub fn branch(&mut self, target: BlockId, args: &[ValueId]) -> Result<OpId> {
        self.func.block(target)?;
        self.create(Op::Branch { target, args: args.into() }, [])
    }

    pub fn ret(&mut self, values: &[ValueId]) -> Result<OpId> {
        self.create(Op::Return { values: SmallVec::from_slice(values) }, [])
    }
}
