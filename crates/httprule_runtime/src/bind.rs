//! Assigning captured values into request messages.
//!
//! Generated code implements [`Bindable`] for every request message and
//! every message reachable from one through singular fields.
use httprule::FieldPath;

/// A decoded scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
}

impl Scalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Double(_) => "double",
            Scalar::Float(_) => "float",
            Scalar::Int32(_) => "int32",
            Scalar::Int64(_) => "int64",
            Scalar::Uint32(_) => "uint32",
            Scalar::Uint64(_) => "uint64",
            Scalar::Bool(_) => "bool",
            Scalar::String(_) => "string",
            Scalar::Bytes(_) => "bytes",
        }
    }
}

/// Value assigned to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Single(Scalar),
    List(Vec<Scalar>),
}

impl FieldValue {
    /// Unwrap a singular value of type `T`.
    pub fn into_single<T: FromScalar>(self) -> Result<T, BindError> {
        match self {
            FieldValue::Single(scalar) => T::from_scalar(scalar),
            FieldValue::List(_) => Err(BindError::Shape {
                expected: "a single value",
            }),
        }
    }

    /// Unwrap a list of values of type `T`.
    pub fn into_list<T: FromScalar>(self) -> Result<Vec<T>, BindError> {
        match self {
            FieldValue::List(scalars) => scalars.into_iter().map(T::from_scalar).collect(),
            FieldValue::Single(_) => Err(BindError::Shape { expected: "a list" }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("no field named {0:?}")]
    UnknownField(String),
    #[error("field {0:?} is not a message")]
    NotAMessage(String),
    #[error("expected a {expected} value, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("expected {expected}")]
    Shape { expected: &'static str },
}

impl BindError {
    pub fn unknown_field(name: &str) -> Self {
        BindError::UnknownField(name.to_string())
    }
}

/// A message whose fields can be set by name.
pub trait Bindable {
    /// The nested message stored in `field`, created with default values if
    /// absent. `None` if `field` is not a singular message field.
    fn message_mut(&mut self, field: &str) -> Option<&mut dyn Bindable>;

    /// Assign `value` to the scalar field `field`.
    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), BindError>;
}

/// Rust types a [`Scalar`] converts into.
pub trait FromScalar: Sized {
    fn from_scalar(scalar: Scalar) -> Result<Self, BindError>;
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident, $name:literal;)+) => {
        $(
            impl FromScalar for $ty {
                fn from_scalar(scalar: Scalar) -> Result<Self, BindError> {
                    match scalar {
                        Scalar::$variant(v) => Ok(v),
                        other => Err(BindError::TypeMismatch {
                            expected: $name,
                            found: other.type_name(),
                        }),
                    }
                }
            }
        )+
    };
}

impl_from_scalar! {
    f64 => Double, "double";
    f32 => Float, "float";
    i32 => Int32, "int32";
    i64 => Int64, "int64";
    u32 => Uint32, "uint32";
    u64 => Uint64, "uint64";
    bool => Bool, "bool";
    String => String, "string";
    Vec<u8> => Bytes, "bytes";
}

/// Descend into the message at `path`, creating every message on the way.
pub fn ensure<'t>(
    target: &'t mut dyn Bindable,
    path: &[String],
) -> Result<&'t mut dyn Bindable, BindError> {
    let mut current = target;

    for name in path {
        current = current
            .message_mut(name)
            .ok_or_else(|| BindError::NotAMessage(name.clone()))?;
    }

    Ok(current)
}

/// Assign `value` to the field at `path`, creating its parent messages.
pub fn assign(
    target: &mut dyn Bindable,
    path: &FieldPath,
    value: FieldValue,
) -> Result<(), BindError> {
    let (leaf, parents) = path
        .segments()
        .split_last()
        .ok_or_else(|| BindError::unknown_field(""))?;

    ensure(target, parents)?.assign(leaf, value)
}
