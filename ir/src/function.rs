//! Functions, basic blocks and SSA values.
//!
//! A [`Function`] owns an arena of operations and values. Blocks hold the
//! ordered list of their live operations; erasing an operation removes it from
//! its block and tombstones its arena slot, so ids of other operations stay
//! stable across rewrites.

use std::collections::HashMap;

use lumen_dtype::DType;
use smallvec::SmallVec;
use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::op::Op;
use crate::types::{BlockId, ConstValue, OpId, ValueId};

/// Where an SSA value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDef {
    /// Argument of a block. Entry block arguments are the function parameters.
    BlockArg { block: BlockId, index: usize },
    /// Result of an operation.
    OpResult { op: OpId, index: usize },
}

#[derive(Debug, Clone)]
pub struct ValueData {
    pub dtype: DType,
    pub def: ValueDef,
}

/// An operation placed in a block.
#[derive(Debug, Clone)]
pub struct Operation {
    pub op: Op,
    pub results: SmallVec<[ValueId; 1]>,
    pub block: BlockId,
}

impl Operation {
    pub fn result(&self) -> Option<ValueId> {
        self.results.first().copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    args: SmallVec<[ValueId; 4]>,
    ops: Vec<OpId>,
}

impl Block {
    pub fn args(&self) -> &[ValueId] {
        &self.args
    }

    pub fn ops(&self) -> &[OpId] {
        &self.ops
    }
}

/// A function body in SSA form.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    blocks: Vec<Block>,
    ops: Vec<Option<Operation>>,
    values: Vec<ValueData>,
}

/// Where the builder inserts new operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPoint {
    /// Immediately before an existing operation.
    Before(OpId),
    /// At the end of a block.
    BlockEnd(BlockId),
}

impl Function {
    /// Create a function whose entry block takes `params` as arguments.
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = DType>) -> Self {
        let mut func = Self { name: name.into(), blocks: Vec::new(), ops: Vec::new(), values: Vec::new() };
        func.add_block(params);
        func
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    /// Function parameters, i.e. the entry block arguments.
    pub fn params(&self) -> &[ValueId] {
        &self.blocks[0].args
    }

    pub fn add_block(&mut self, arg_types: impl IntoIterator<Item = DType>) -> BlockId {
        let block = BlockId(self.blocks.len() as u32);
        let mut args = SmallVec::new();
        for (index, dtype) in arg_types.into_iter().enumerate() {
            args.push(self.new_value(dtype, ValueDef::BlockArg { block, index }));
        }
        self.blocks.push(Block { args, ops: Vec::new() });
        block
    }

    pub fn block(&self, block: BlockId) -> Result<&Block> {
        self.blocks.get(block.index()).context(UnknownBlockSnafu { block })
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        (0..self.blocks.len() as u32).map(BlockId)
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    // =========================================================================
    // Values
    // =========================================================================

    fn new_value(&mut self, dtype: DType, def: ValueDef) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(ValueData { dtype, def });
        id
    }

    pub fn value(&self, value: ValueId) -> Result<&ValueData> {
        self.values.get(value.index()).context(UnknownValueSnafu { value })
    }

    pub fn value_type(&self, value: ValueId) -> Result<&DType> {
        Ok(&self.value(value)?.dtype)
    }

    /// True if the value is a block argument (it has no producing operation).
    pub fn is_block_argument(&self, value: ValueId) -> Result<bool> {
        Ok(matches!(self.value(value)?.def, ValueDef::BlockArg { .. }))
    }

    pub fn defining_op(&self, value: ValueId) -> Result<Option<OpId>> {
        Ok(match self.value(value)?.def {
            ValueDef::OpResult { op, .. } => Some(op),
            ValueDef::BlockArg { .. } => None,
        })
    }

    /// Constant payload of a value produced by a `const` operation.
    pub fn constant_value(&self, value: ValueId) -> Option<&ConstValue> {
        let op = self.defining_op(value).ok()??;
        self.op(op).ok()?.op.as_const()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    pub fn op(&self, op: OpId) -> Result<&Operation> {
        self.ops.get(op.index()).and_then(Option::as_ref).context(UnknownOpSnafu { op })
    }

    /// Iterate over live operations in program order (block by block).
    pub fn walk(&self) -> impl Iterator<Item = (OpId, &Operation)> + '_ {
        self.blocks
            .iter()
            .flat_map(|block| block.ops.iter())
            .filter_map(|&id| self.ops[id.index()].as_ref().map(|operation| (id, operation)))
    }

    /// Position of an operation within its block.
    pub fn position(&self, op: OpId) -> Result<(BlockId, usize)> {
        self.position_hinted(op, None)
    }

    /// Like [`Function::position`], checking `hint` before scanning the block.
    fn position_hinted(&self, op: OpId, hint: Option<usize>) -> Result<(BlockId, usize)> {
        let block = self.op(op)?.block;
        let ops = &self.blocks[block.index()].ops;
        if let Some(index) = hint
            && ops.get(index) == Some(&op)
        {
            return Ok((block, index));
        }
        let index = ops.iter().position(|&o| o == op).context(UnknownOpSnafu { op })?;
        Ok((block, index))
    }

    /// `Some(true)` if `a` precedes `b` in the same block, `None` if they live in different blocks.
    pub fn is_before_in_block(&self, a: OpId, b: OpId) -> Result<Option<bool>> {
        let (block_a, index_a) = self.position(a)?;
        let (block_b, index_b) = self.position(b)?;
        Ok((block_a == block_b).then_some(index_a < index_b))
    }

    /// Insert an operation at `at`, returning its id and index in the block.
    ///
    /// `hint` is the expected index of a [`InsertPoint::Before`] anchor.
    pub(crate) fn insert(
        &mut self,
        op: Op,
        result_types: SmallVec<[DType; 1]>,
        at: InsertPoint,
        hint: Option<usize>,
    ) -> Result<(OpId, usize)> {
        for operand in op.operands() {
            ensure!(operand.index() < self.values.len(), UnknownValueSnafu { value: operand });
        }

        let (block, index) = match at {
            InsertPoint::Before(anchor) => self.position_hinted(anchor, hint)?,
            InsertPoint::BlockEnd(block) => (block, self.block(block)?.ops.len()),
        };

        let id = OpId(self.ops.len() as u32);
        let results = result_types
            .into_iter()
            .enumerate()
            .map(|(slot, dtype)| self.new_value(dtype, ValueDef::OpResult { op: id, index: slot }))
            .collect();
        self.ops.push(Some(Operation { op, results, block }));
        self.blocks[block.index()].ops.insert(index, id);
        Ok((id, index))
    }

    /// Erase an operation. Fails if any of its results still has users.
    pub fn erase(&mut self, op: OpId) -> Result<Operation> {
        let (block, index) = self.position(op)?;
        let results = &self.op(op)?.results;
        if !results.is_empty() {
            let users: SmallVec<[OpId; 4]> = self
                .walk()
                .filter(|(_, user)| user.op.operands().iter().any(|operand| results.contains(operand)))
                .map(|(id, _)| id)
                .collect();
            ensure!(users.is_empty(), ValueStillUsedSnafu { op, users });
        }

        self.blocks[block.index()].ops.remove(index);
        self.ops[op.index()].take().context(UnknownOpSnafu { op })
    }

    // =========================================================================
    // Def-use
    // =========================================================================

    /// Snapshot of the def-use edges of every live operation.
    pub fn use_index(&self) -> UseIndex {
        let mut users: HashMap<ValueId, SmallVec<[OpId; 4]>> = HashMap::new();
        for (id, operation) in self.walk() {
            for operand in operation.op.operands() {
                let entry = users.entry(operand).or_default();
                if !entry.contains(&id) {
                    entry.push(id);
                }
            }
        }
        UseIndex { users }
    }

    /// Snapshot of the block positions of every live operation.
    pub fn op_order(&self) -> OpOrder {
        let mut positions = HashMap::with_capacity(self.ops.len());
        for (block, data) in self.blocks.iter().enumerate() {
            for (index, &op) in data.ops.iter().enumerate() {
                positions.insert(op, (BlockId(block as u32), index));
            }
        }
        OpOrder { positions }
    }
}

/// Operation → `(block, index)`, as of the moment it was built.
///
/// Inserting operations later shifts indices but keeps the relative order of
/// the operations recorded here, so comparisons between them stay valid.
/// Erasing an operation does not.
#[derive(Debug, Clone, Default)]
pub struct OpOrder {
    positions: HashMap<OpId, (BlockId, usize)>,
}

impl OpOrder {
    pub fn position(&self, op: OpId) -> Result<(BlockId, usize)> {
        self.positions.get(&op).copied().context(UnknownOpSnafu { op })
    }
}

/// Value → consuming operations, as of the moment it was built.
#[derive(Debug, Clone, Default)]
pub struct UseIndex {
    users: HashMap<ValueId, SmallVec<[OpId; 4]>>,
}

impl UseIndex {
    pub fn users(&self, value: ValueId) -> &[OpId] {
        self.users.get(&value).map(SmallVec::as_slice).unwrap_or_default()
    }

    pub fn has_users(&self, value: ValueId) -> bool {
        !self.users(value).is_empty()
    }
}
