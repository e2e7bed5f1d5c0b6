//! Interactive pipeline assembly and the persisted master description

pub mod assembler;
pub mod master;
pub mod options;
pub mod prereq;

pub use assembler::{Assembler, InputUnavailableError};
pub use master::{Bindings, InvocationLine, MasterDescription, MasterWriter, BINDING_KEYS};
pub use options::STOP;
pub use prereq::PrerequisiteError;
