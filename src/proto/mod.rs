pub mod encoding;
pub mod family;
pub mod literal;
pub mod translator;

pub use encoding::ProtoEncoding;
pub use family::{Family, Prefixed, Var1, Var2, Var3, VarN};
pub use literal::{MAX_VARIABLES, ProtoLit};
pub use translator::{LitTranslator, Numbering};
