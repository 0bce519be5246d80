//! In-memory reference implementation of the host contract.
//!
//! Hosts that already have their own class, method and instruction nodes implement the traits in
//! [`crate::host`] directly. This module is for everything else: tests, the command line tool,
//! and embedders that translate their representation into a simple owned tree first.
//!
//! # Examples
//!
//! ```rust
//! use strscope::host::{InvokeKind, MethodSignature};
//! use strscope::ir::{ClassDef, Insn, InsnArg, MethodDef};
//!
//! let lookup = MethodSignature::new(
//!     "runtime.Strings.StringIndexer",
//!     "_getString",
//!     "(Ljava/lang/String;)Ljava/lang/String;",
//! );
//! let class = ClassDef::new("com.example.Main").with_method(
//!     MethodDef::new("greet")
//!         .with_insn(Insn::invoke(InvokeKind::Static, lookup, vec![InsnArg::Literal(1)])),
//! );
//!
//! assert_eq!(class.methods.len(), 1);
//! assert_eq!(class.methods[0].instructions.len(), 1);
//! ```

mod insn;

use std::fmt;

pub use insn::{Insn, InsnArg, InsnOp};

use crate::host::{ClassNode, CommentStyle, MethodNode};

/// A comment attached to a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeComment {
    /// Comment text
    pub text: String,
    /// Rendering style
    pub style: CommentStyle,
}

impl fmt::Display for CodeComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            CommentStyle::Line => write!(f, "// {}", self.text),
            CommentStyle::Block => write!(f, "/* {} */", self.text),
            CommentStyle::Javadoc => write!(f, "/** {} */", self.text),
        }
    }
}

/// A method and its instruction list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Instructions in order
    pub instructions: Vec<Insn>,
}

impl MethodDef {
    /// Creates a method without instructions.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        MethodDef {
            name: name.into(),
            instructions: Vec::new(),
        }
    }

    /// Appends an instruction.
    #[must_use]
    pub fn with_insn(mut self, insn: Insn) -> Self {
        self.instructions.push(insn);
        self
    }
}

impl MethodNode for MethodDef {
    type Insn = Insn;

    fn name(&self) -> &str {
        &self.name
    }

    fn instructions(&self) -> &[Insn] {
        &self.instructions
    }

    fn instructions_mut(&mut self) -> &mut [Insn] {
        &mut self.instructions
    }
}

/// A class with its attached comments and methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDef {
    /// Fully qualified class name
    pub name: String,
    /// Comments in the order they were attached
    pub comments: Vec<CodeComment>,
    /// Methods in declaration order
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    /// Creates an empty class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            comments: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Appends a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl ClassNode for ClassDef {
    type Method = MethodDef;

    fn name(&self) -> &str {
        &self.name
    }

    fn add_code_comment(&mut self, text: &str, style: CommentStyle) {
        self.comments.push(CodeComment {
            text: text.to_string(),
            style,
        });
    }

    fn methods_mut(&mut self) -> &mut [MethodDef] {
        &mut self.methods
    }
}

impl fmt::Display for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for comment in &self.comments {
            writeln!(f, "{comment}")?;
        }
        writeln!(f, "class {} {{", self.name)?;
        for method in &self.methods {
            writeln!(f, "    {}() {{", method.name)?;
            for insn in &method.instructions {
                writeln!(f, "        {insn}")?;
            }
            writeln!(f, "    }}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InsnNode, InvokeKind, MethodSignature};

    #[test]
    fn comments_accumulate() {
        let mut class = ClassDef::new("a.B");
        class.add_code_comment("first", CommentStyle::Block);
        class.add_code_comment("second", CommentStyle::Line);
        assert_eq!(class.comments.len(), 2);
        assert_eq!(class.comments[0].to_string(), "/* first */");
        assert_eq!(class.comments[1].to_string(), "// second");
    }

    #[test]
    fn trait_access() {
        let mut class = ClassDef::new("a.B").with_method(
            MethodDef::new("run")
                .with_insn(Insn::new(InsnOp::Const(1), vec![InsnArg::Register(0)]))
                .with_insn(Insn::new(InsnOp::Return, vec![])),
        );

        assert_eq!(ClassNode::name(&class), "a.B");
        let methods = class.methods_mut();
        assert_eq!(methods.len(), 1);
        assert_eq!(MethodNode::name(&methods[0]), "run");
        assert_eq!(methods[0].instructions().len(), 2);
        assert!(methods[0].instructions_mut()[0].invoke_kind().is_none());
    }

    #[test]
    fn display_renders_tree() {
        let mut class = ClassDef::new("a.B").with_method(MethodDef::new("run").with_insn(
            Insn::invoke(
                InvokeKind::Virtual,
                MethodSignature::new("a.B", "log", "()V"),
                vec![],
            ),
        ));
        class.add_code_comment("note", CommentStyle::Javadoc);

        assert_eq!(
            class.to_string(),
            "/** note */\nclass a.B {\n    run() {\n        invoke-virtual a.B.log()V\n    }\n}"
        );
        assert!(class.method("run").is_some());
        assert!(class.method("missing").is_none());
    }
}
