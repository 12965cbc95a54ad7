/// Boxed error for binary glue where the concrete type does not matter.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

pub type AnyResult<T> = std::result::Result<T, AnyError>;
