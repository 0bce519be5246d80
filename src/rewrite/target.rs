use std::fmt;

use crate::host::{InsnNode, InvokeKind, MethodSignature};

/// Declaring class of the obfuscated runtime lookup.
pub const STRING_INDEXER_OWNER: &str = "runtime.Strings.StringIndexer";

/// Name of the obfuscated runtime lookup.
pub const STRING_INDEXER_METHOD: &str = "_getString";

/// Descriptor of the obfuscated runtime lookup.
pub const STRING_INDEXER_DESCRIPTOR: &str = "(Ljava/lang/String;)Ljava/lang/String;";

/// Call sites a replacer pass rewrites: invoke kind, callee and the argument holding the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteTarget {
    /// Required dispatch kind
    pub kind: InvokeKind,
    /// Required callee
    pub signature: MethodSignature,
    /// Position of the index argument
    pub arg_index: usize,
}

impl RewriteTarget {
    /// Creates a target for static calls to `signature` taking the index as first argument.
    #[must_use]
    pub fn new(signature: MethodSignature) -> Self {
        RewriteTarget {
            kind: InvokeKind::Static,
            signature,
            arg_index: 0,
        }
    }

    /// The `StringIndexer._getString(String)` lookup.
    #[must_use]
    pub fn string_indexer() -> Self {
        RewriteTarget::new(MethodSignature::new(
            STRING_INDEXER_OWNER,
            STRING_INDEXER_METHOD,
            STRING_INDEXER_DESCRIPTOR,
        ))
    }

    /// Returns `true` if `insn` is a call of the target kind to the target callee.
    pub fn matches<I: InsnNode>(&self, insn: &I) -> bool {
        insn.invoke_kind() == Some(self.kind)
            && insn
                .call_signature()
                .is_some_and(|sig| *sig == self.signature)
    }
}

impl Default for RewriteTarget {
    fn default() -> Self {
        RewriteTarget::string_indexer()
    }
}

impl fmt::Display for RewriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invoke-{} {}", self.kind, self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Insn, InsnArg, InsnOp};

    #[test]
    fn default_full_name() {
        let target = RewriteTarget::default();
        assert_eq!(
            target.signature.full_name(),
            "runtime.Strings.StringIndexer._getString(Ljava/lang/String;)Ljava/lang/String;"
        );
        assert_eq!(target.kind, InvokeKind::Static);
        assert_eq!(target.arg_index, 0);
    }

    #[test]
    fn matches_kind_and_signature() {
        let target = RewriteTarget::default();
        let args = vec![InsnArg::Literal(1)];

        let hit = Insn::invoke(InvokeKind::Static, target.signature.clone(), args.clone());
        assert!(target.matches(&hit));

        let virtual_call = Insn::invoke(InvokeKind::Virtual, target.signature.clone(), args.clone());
        assert!(!target.matches(&virtual_call));

        let other_descriptor = Insn::invoke(
            InvokeKind::Static,
            MethodSignature::new(STRING_INDEXER_OWNER, STRING_INDEXER_METHOD, "(I)Ljava/lang/String;"),
            args.clone(),
        );
        assert!(!target.matches(&other_descriptor));

        assert!(!target.matches(&Insn::new(InsnOp::Const(1), args)));
    }
}
