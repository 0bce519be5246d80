use std::fmt;

use crate::{
    host::{InsnNode, InvokeKind, MethodSignature},
    Error, Result,
};

/// Operation performed by an [`Insn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsnOp {
    /// No operation
    Nop,
    /// Load an integer constant
    Const(i64),
    /// Load a string constant
    ConstString(String),
    /// Call a method
    Invoke {
        /// Dispatch kind
        kind: InvokeKind,
        /// Callee
        method: MethodSignature,
    },
    /// Copy a value between registers
    Move,
    /// Return from the method
    Return,
    /// Any other operation, kept by mnemonic
    Other(String),
}

/// Operand of an [`Insn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsnArg {
    /// Literal integer constant
    Literal(i64),
    /// Value held in a register
    Register(u16),
    /// Value produced by an inlined instruction
    Wrapped(Box<Insn>),
}

impl InsnArg {
    /// Wraps an instruction as an operand.
    #[must_use]
    pub fn wrap(insn: Insn) -> Self {
        InsnArg::Wrapped(Box::new(insn))
    }

    /// Returns the string held by a wrapped string constant.
    #[must_use]
    pub fn as_const_string(&self) -> Option<&str> {
        match self {
            InsnArg::Wrapped(insn) => match &insn.op {
                InsnOp::ConstString(value) => Some(value),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for InsnArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsnArg::Literal(value) => write!(f, "{value}"),
            InsnArg::Register(reg) => write!(f, "r{reg}"),
            InsnArg::Wrapped(insn) => write!(f, "{insn}"),
        }
    }
}

/// A single instruction of the reference model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insn {
    /// What the instruction does
    pub op: InsnOp,
    /// Operands in order
    pub args: Vec<InsnArg>,
}

impl Insn {
    /// Creates an instruction from an operation and its operands.
    #[must_use]
    pub fn new(op: InsnOp, args: Vec<InsnArg>) -> Self {
        Insn { op, args }
    }

    /// Creates a call instruction.
    #[must_use]
    pub fn invoke(kind: InvokeKind, method: MethodSignature, args: Vec<InsnArg>) -> Self {
        Insn::new(InsnOp::Invoke { kind, method }, args)
    }

    /// Creates a string constant.
    #[must_use]
    pub fn const_string(value: impl Into<String>) -> Self {
        Insn::new(InsnOp::ConstString(value.into()), Vec::new())
    }

    /// Creates an instruction that only carries a mnemonic.
    #[must_use]
    pub fn other(mnemonic: impl Into<String>, args: Vec<InsnArg>) -> Self {
        Insn::new(InsnOp::Other(mnemonic.into()), args)
    }
}

impl InsnNode for Insn {
    fn invoke_kind(&self) -> Option<InvokeKind> {
        match &self.op {
            InsnOp::Invoke { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    fn call_signature(&self) -> Option<&MethodSignature> {
        match &self.op {
            InsnOp::Invoke { method, .. } => Some(method),
            _ => None,
        }
    }

    fn arg_count(&self) -> usize {
        self.args.len()
    }

    fn literal_arg(&self, index: usize) -> Option<i64> {
        match self.args.get(index)? {
            InsnArg::Literal(value) => Some(*value),
            _ => None,
        }
    }

    fn replace_arg_with_string(&mut self, index: usize, value: String) -> Result<()> {
        let Some(arg) = self.args.get_mut(index) else {
            return Err(Error::OutOfBounds);
        };
        *arg = InsnArg::wrap(Insn::const_string(value));
        Ok(())
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            InsnOp::Nop => f.write_str("nop")?,
            InsnOp::Const(value) => write!(f, "const {value}")?,
            InsnOp::ConstString(value) => return write!(f, "\"{}\"", value.escape_debug()),
            InsnOp::Invoke { kind, method } => write!(f, "invoke-{kind} {method}")?,
            InsnOp::Move => f.write_str("move")?,
            InsnOp::Return => f.write_str("return")?,
            InsnOp::Other(mnemonic) => f.write_str(mnemonic)?,
        }

        if !self.args.is_empty() {
            f.write_str(" (")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(args: Vec<InsnArg>) -> Insn {
        Insn::invoke(
            InvokeKind::Static,
            MethodSignature::new("a.B", "get", "(Ljava/lang/String;)Ljava/lang/String;"),
            args,
        )
    }

    #[test]
    fn invoke_accessors() {
        let insn = call(vec![InsnArg::Literal(7), InsnArg::Register(2)]);
        assert_eq!(insn.invoke_kind(), Some(InvokeKind::Static));
        assert_eq!(insn.call_signature().unwrap().name, "get");
        assert_eq!(insn.arg_count(), 2);
        assert_eq!(insn.literal_arg(0), Some(7));
        assert_eq!(insn.literal_arg(1), None);
        assert_eq!(insn.literal_arg(2), None);

        let plain = Insn::new(InsnOp::Return, vec![]);
        assert_eq!(plain.invoke_kind(), None);
        assert!(plain.call_signature().is_none());
    }

    #[test]
    fn replace_arg_wraps_const_string() {
        let mut insn = call(vec![InsnArg::Literal(7)]);
        insn.replace_arg_with_string(0, "Hello".to_string()).unwrap();

        assert_eq!(insn.args[0].as_const_string(), Some("Hello"));
        assert_eq!(insn.literal_arg(0), None);
        assert!(matches!(
            insn.replace_arg_with_string(1, "x".to_string()),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn display() {
        let mut insn = call(vec![InsnArg::Literal(7)]);
        assert_eq!(
            insn.to_string(),
            "invoke-static a.B.get(Ljava/lang/String;)Ljava/lang/String; (7)"
        );

        insn.replace_arg_with_string(0, "say \"hi\"".to_string())
            .unwrap();
        assert!(insn.to_string().ends_with("(\"say \\\"hi\\\"\")"));
        assert_eq!(Insn::new(InsnOp::Const(3), vec![InsnArg::Register(0)]).to_string(), "const 3 (r0)");
    }
}
