//! Typed conversion into and out of [`Value`].
//!
//! A requested Rust type declares the wire shape it wants through a
//! [`TypeRequest`]; converters use that to decide whether they can produce it,
//! and [`FromValue::from_value`] does the final checked conversion.

use std::io::Cursor;

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::encoding::Encoding;
use crate::message::{Message, MessageValue};
use crate::named::Named;
use crate::unnamed::Unnamed;
use crate::value::Value;
use crate::{Error, Result};

/// The wire shape a requested type can be built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Any shape; the first converter that recognizes the payload wins.
    Any,
    Void,
    Bytes,
    /// A message with the given fully-qualified type name.
    Message(&'static str),
    Json,
    Unnamed,
    Named,
}

/// What a caller asks a converter to deserialize into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeRequest {
    shape: Shape,
    nullable: bool,
    type_name: &'static str,
}

impl TypeRequest {
    /// A non-nullable request for `T` with the given shape.
    pub fn of<T: ?Sized>(shape: Shape) -> Self {
        Self {
            shape,
            nullable: false,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The same request, also accepting null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// True if a null payload can satisfy this request.
    pub fn accepts_null(&self) -> bool {
        self.nullable
    }

    /// Rust type name of the requested type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True if a converter producing `shape` can satisfy this request.
    pub fn accepts(&self, shape: Shape) -> bool {
        self.shape == shape || self.shape == Shape::Any
    }
}

/// Conversion of a Rust value into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Result<Value>;
}

/// Checked conversion of a [`Value`] into a Rust value.
///
/// The `Clone + Send + Sync + 'static` bounds let serialized containers cache
/// decoded values per requested type.
pub trait FromValue: Sized + Clone + Send + Sync + 'static {
    /// The shape this type is built from.
    fn type_request() -> TypeRequest;

    /// Convert, failing with `Error::InvalidCast` on a shape mismatch.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::invalid_cast(std::any::type_name::<T>(), value.describe())
}

impl IntoValue for Value {
    fn into_value(self) -> Result<Value> {
        Ok(self)
    }
}

impl FromValue for Value {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Value>(Shape::Any).nullable()
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

/// Marker for "no value", the result of a procedure that returns nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Void;

impl IntoValue for Void {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Void)
    }
}

impl FromValue for Void {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Void>(Shape::Void)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Void => Ok(Void),
            other => Err(mismatch::<Void>(&other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Result<Value> {
        match self {
            Some(v) => v.into_value(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Option<T>>(T::type_request().shape()).nullable()
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// Binary sequences. Fixed-size arrays and `Vec<u8>` are deliberately absent:
// they are not raw payloads.

impl IntoValue for Bytes {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Bytes(self))
    }
}

impl FromValue for Bytes {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Bytes>(Shape::Bytes)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(mismatch::<Bytes>(&other)),
        }
    }
}

impl IntoValue for BytesMut {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Bytes(self.freeze()))
    }
}

impl FromValue for BytesMut {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<BytesMut>(Shape::Bytes)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(BytesMut::from(&b[..])),
            other => Err(mismatch::<BytesMut>(&other)),
        }
    }
}

/// An in-memory stream; its whole buffer is the payload, whatever the position.
impl IntoValue for Cursor<Vec<u8>> {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Bytes(Bytes::from(self.into_inner())))
    }
}

impl FromValue for Cursor<Vec<u8>> {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Cursor<Vec<u8>>>(Shape::Bytes)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(Cursor::new(b.to_vec())),
            other => Err(mismatch::<Cursor<Vec<u8>>>(&other)),
        }
    }
}

/// A structured message, routed to the protobuf converters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Proto<M>(pub M);

impl<M> Proto<M> {
    pub fn into_inner(self) -> M {
        self.0
    }
}

impl<M: Message> IntoValue for Proto<M> {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Message(MessageValue::new(self.0)))
    }
}

impl<M: Message> FromValue for Proto<M> {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Proto<M>>(Shape::Message(M::type_name()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Message(m) => m.decode::<M>().map(Proto),
            other => Err(mismatch::<Proto<M>>(&other)),
        }
    }
}

/// Any serde type, routed to the JSON converter.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use temporal_payload_core::{FromValue, IntoValue, Json};
///
/// #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// struct Order {
///     id: u64,
/// }
///
/// let value = Json(Order { id: 7 }).into_value().unwrap();
/// let Json(order) = Json::<Order>::from_value(value).unwrap();
/// assert_eq!(order, Order { id: 7 });
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> IntoValue for Json<T> {
    fn into_value(self) -> Result<Value> {
        serde_json::to_value(&self.0)
            .map(Value::Json)
            .map_err(|e| Error::encode(Encoding::JSON, e.to_string()))
    }
}

impl<T: DeserializeOwned + Clone + Send + Sync + 'static> FromValue for Json<T> {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Json<T>>(Shape::Json)
    }

    fn from_value(value: Value) -> Result<Self> {
        from_json(value).map(Json)
    }
}

fn from_json<T: DeserializeOwned>(value: Value) -> Result<T> {
    match value {
        Value::Json(json) => {
            let actual = Value::describe_json(&json);
            serde_json::from_value(json).map_err(|e| {
                Error::invalid_cast(std::any::type_name::<T>(), format!("{} ({})", actual, e))
            })
        }
        other => Err(mismatch::<T>(&other)),
    }
}

macro_rules! json_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Result<Value> {
                    Json(self).into_value()
                }
            }

            impl FromValue for $ty {
                fn type_request() -> TypeRequest {
                    TypeRequest::of::<$ty>(Shape::Json)
                }

                fn from_value(value: Value) -> Result<Self> {
                    from_json(value)
                }
            }
        )*
    };
}

json_scalar!(String, bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl IntoValue for &str {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Json(serde_json::Value::String(self.to_string())))
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Json(self))
    }
}

impl FromValue for serde_json::Value {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<serde_json::Value>(Shape::Json)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(json) => Ok(json),
            other => Err(mismatch::<serde_json::Value>(&other)),
        }
    }
}

impl IntoValue for Unnamed {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Unnamed(self))
    }
}

impl FromValue for Unnamed {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Unnamed>(Shape::Unnamed)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Unnamed(u) => Ok(u),
            other => Err(mismatch::<Unnamed>(&other)),
        }
    }
}

impl IntoValue for Named {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Named(self))
    }
}

impl FromValue for Named {
    fn type_request() -> TypeRequest {
        TypeRequest::of::<Named>(Shape::Named)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Named(n) => Ok(n),
            other => Err(mismatch::<Named>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::tests::Toggle;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct TestStruct {
        name: String,
        age: u32,
    }

    #[test]
    fn struct_roundtrip_through_json() {
        let original = TestStruct {
            name: "Alice".to_string(),
            age: 30,
        };

        let value = Json(original.clone()).into_value().unwrap();
        assert!(matches!(value, Value::Json(_)));

        let Json(recovered) = Json::<TestStruct>::from_value(value).unwrap();
        assert_eq!(original, recovered);
    }

    #[test]
    fn scalars_are_json() {
        assert_eq!(
            42i32.into_value().unwrap(),
            Value::Json(serde_json::json!(42))
        );
        assert_eq!(
            "hello".into_value().unwrap(),
            Value::Json(serde_json::json!("hello"))
        );
        assert_eq!(String::from_value(Value::Json(serde_json::json!("x"))).unwrap(), "x");
    }

    #[test]
    fn checked_numeric_conversion() {
        let value = Value::Json(serde_json::json!(300));
        assert_eq!(i64::from_value(value.clone()).unwrap(), 300);
        assert!(matches!(
            u8::from_value(value),
            Err(Error::InvalidCast { .. })
        ));
    }

    #[test]
    fn shape_mismatch_is_invalid_cast() {
        let result = String::from_value(Value::Bytes(Bytes::from_static(b"abc")));
        match result {
            Err(Error::InvalidCast { expected, actual }) => {
                assert!(expected.contains("String"));
                assert_eq!(actual, "bytes");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(None::<i32>.into_value().unwrap(), Value::Null);
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::from_value(Value::Json(serde_json::json!(5))).unwrap(),
            Some(5)
        );
    }

    #[test]
    fn non_nullable_rejects_null() {
        assert!(matches!(
            i32::from_value(Value::Null),
            Err(Error::InvalidCast { .. })
        ));
        assert!(!i32::type_request().accepts_null());
        assert!(Option::<i32>::type_request().accepts_null());
    }

    #[test]
    fn option_keeps_inner_shape() {
        let request = Option::<Bytes>::type_request();
        assert_eq!(request.shape(), Shape::Bytes);
        assert!(request.type_name().contains("Option"));
    }

    #[test]
    fn binary_sequences_share_shape() {
        let data = vec![0u8, 1, 2, 255];

        let stream = Cursor::new(data.clone());
        let value = stream.into_value().unwrap();
        assert_eq!(value, Value::Bytes(Bytes::from(data.clone())));

        let back = BytesMut::from_value(value.clone()).unwrap();
        assert_eq!(&back[..], &data[..]);

        let back = Cursor::<Vec<u8>>::from_value(value).unwrap();
        assert_eq!(back.into_inner(), data);
    }

    #[test]
    fn proto_wrapper() {
        let value = Proto(Toggle { id: 2, flag: true }).into_value().unwrap();
        assert!(matches!(value, Value::Message(_)));

        let request = Proto::<Toggle>::type_request();
        assert_eq!(request.shape(), Shape::Message("test.Toggle"));

        let Proto(back) = Proto::<Toggle>::from_value(value).unwrap();
        assert_eq!(back, Toggle { id: 2, flag: true });
    }

    #[test]
    fn void_only_from_void() {
        assert_eq!(Void.into_value().unwrap(), Value::Void);
        assert_eq!(Void::from_value(Value::Void).unwrap(), Void);
        assert!(Void::from_value(Value::Null).is_err());
    }

    #[test]
    fn any_request_accepts_every_shape() {
        let request = Value::type_request();
        assert!(request.accepts(Shape::Json));
        assert!(request.accepts(Shape::Void));
        assert!(request.accepts_null());

        let request = String::type_request();
        assert!(request.accepts(Shape::Json));
        assert!(!request.accepts(Shape::Bytes));
    }
}
