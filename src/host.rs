//! Contract between the rewrite pass and a decompiler host.
//!
//! The rewrite pass never owns the host's node types. It only needs a handful of capabilities:
//! walking a class's methods, walking a method's instructions in order, inspecting an invoke, and
//! swapping a literal argument for a string constant. Hosts expose these through [`ClassNode`],
//! [`MethodNode`] and [`InsnNode`]; [`crate::ir`] provides a ready-made implementation.

use std::fmt;

use strum::{Display, EnumString};

use crate::Result;

/// Dispatch kind of a call instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InvokeKind {
    /// Static method call
    Static,
    /// Virtual dispatch
    Virtual,
    /// Direct (non-virtual) instance call
    Direct,
    /// Interface dispatch
    Interface,
    /// Call to the superclass implementation
    Super,
    /// Signature-polymorphic call
    Polymorphic,
    /// Call site bound through a bootstrap method
    Custom,
}

/// How a comment is rendered in decompiled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CommentStyle {
    /// `// text`
    Line,
    /// `/* text */`
    Block,
    /// `/** text */`
    Javadoc,
}

/// Fully qualified reference to a method: declaring class, name and type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Dotted name of the declaring class
    pub owner: String,
    /// Method name
    pub name: String,
    /// JVM-style descriptor, e.g. `(Ljava/lang/String;)Ljava/lang/String;`
    pub descriptor: String,
}

impl MethodSignature {
    /// Creates a new signature.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        MethodSignature {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Parses the `owner.name(args)ret` form produced by [`MethodSignature::full_name`].
    ///
    /// Returns `None` if the descriptor or the owner separator is missing.
    #[must_use]
    pub fn parse(full_name: &str) -> Option<Self> {
        let open = full_name.find('(')?;
        let (path, descriptor) = full_name.split_at(open);
        let (owner, name) = path.rsplit_once('.')?;
        if owner.is_empty() || name.is_empty() || !descriptor.contains(')') {
            return None;
        }
        Some(MethodSignature::new(owner, name, descriptor))
    }

    /// The canonical full name, `owner.name` immediately followed by the descriptor.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}{}", self.owner, self.name, self.descriptor)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.descriptor)
    }
}

/// An instruction of a decompiled method.
///
/// Rewrites are staged on clones and only written back once every call site of a method
/// succeeded.
pub trait InsnNode: Clone {
    /// Dispatch kind if this instruction is a call, `None` otherwise.
    fn invoke_kind(&self) -> Option<InvokeKind>;

    /// Callee if this instruction is a call, `None` otherwise.
    fn call_signature(&self) -> Option<&MethodSignature>;

    /// Number of arguments.
    fn arg_count(&self) -> usize;

    /// Value of argument `index` if it is a literal integer constant.
    fn literal_arg(&self, index: usize) -> Option<i64>;

    /// Replaces argument `index` with a new string-constant node holding `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` does not name an argument.
    fn replace_arg_with_string(&mut self, index: usize, value: String) -> Result<()>;
}

/// A decompiled method.
///
/// The engine clones a method before visiting it with several passes so that a failing pass
/// can put it back.
pub trait MethodNode: Clone {
    /// The host's instruction type.
    type Insn: InsnNode;

    /// Method name, used in events and error reports.
    fn name(&self) -> &str;

    /// Instructions in their original order.
    fn instructions(&self) -> &[Self::Insn];

    /// Mutable access to the instructions. Implementations must not reorder them.
    fn instructions_mut(&mut self) -> &mut [Self::Insn];
}

/// A decompiled class.
pub trait ClassNode {
    /// The host's method type.
    type Method: MethodNode;

    /// Fully qualified class name.
    fn name(&self) -> &str;

    /// Attaches a comment to the class declaration.
    fn add_code_comment(&mut self, text: &str, style: CommentStyle);

    /// Mutable access to the class's methods.
    fn methods_mut(&mut self) -> &mut [Self::Method];
}
