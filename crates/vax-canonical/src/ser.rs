//! Direct `serde::Serializer` into [`CanonicalValue`].
//!
//! Serializing straight into the canonical value type keeps number admission
//! in one place: every float passes through [`Number::from_f64`], so NaN and
//! infinities fail with `InvalidNumber` instead of degrading to `null` the
//! way a lenient JSON intermediate would.

use std::collections::BTreeMap;

use serde::ser::{self, Serialize};

use crate::encoder::EncodingError;
use crate::number::Number;
use crate::value::CanonicalValue;

impl ser::Error for EncodingError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        EncodingError::UnsupportedType(msg.to_string())
    }
}

pub(crate) struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = CanonicalValue;
    type Error = EncodingError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<CanonicalValue, EncodingError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<CanonicalValue, EncodingError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<CanonicalValue, EncodingError> {
        self.serialize_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Number(Number::from_i64(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<CanonicalValue, EncodingError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<CanonicalValue, EncodingError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<CanonicalValue, EncodingError> {
        self.serialize_u64(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Number(Number::from_u64(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<CanonicalValue, EncodingError> {
        self.serialize_f64(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Number(Number::from_f64(v)?))
    }

    fn serialize_char(self, v: char) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<CanonicalValue, EncodingError> {
        let items = v
            .iter()
            .map(|b| CanonicalValue::Number(Number::from_u64((*b).into())))
            .collect();
        Ok(CanonicalValue::Array(items))
    }

    fn serialize_none(self) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(
        self,
        value: &T,
    ) -> Result<CanonicalValue, EncodingError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<CanonicalValue, EncodingError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<CanonicalValue, EncodingError> {
        let mut map = BTreeMap::new();
        map.insert(variant.to_string(), value.serialize(ValueSerializer)?);
        Ok(CanonicalValue::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec, EncodingError> {
        Ok(SerializeVec {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec, EncodingError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeVec, EncodingError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant, EncodingError> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap, EncodingError> {
        Ok(SerializeMap {
            entries: BTreeMap::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeMap, EncodingError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeStructVariant, EncodingError> {
        Ok(SerializeStructVariant {
            variant,
            entries: BTreeMap::new(),
        })
    }
}

pub(crate) struct SerializeVec {
    items: Vec<CanonicalValue>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = CanonicalValue;
    type Error = EncodingError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodingError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Array(self.items))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = CanonicalValue;
    type Error = EncodingError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodingError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<CanonicalValue, EncodingError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = CanonicalValue;
    type Error = EncodingError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodingError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<CanonicalValue, EncodingError> {
        ser::SerializeSeq::end(self)
    }
}

pub(crate) struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<CanonicalValue>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = CanonicalValue;
    type Error = EncodingError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodingError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CanonicalValue, EncodingError> {
        let mut map = BTreeMap::new();
        map.insert(
            self.variant.to_string(),
            CanonicalValue::Array(self.items),
        );
        Ok(CanonicalValue::Object(map))
    }
}

pub(crate) struct SerializeMap {
    entries: BTreeMap<String, CanonicalValue>,
    pending_key: Option<String>,
}

impl SerializeMap {
    /// Map keys must reduce to text; numeric keys are admitted by their
    /// canonical decimal form, everything else has no object representation.
    fn key_string(value: CanonicalValue) -> Result<String, EncodingError> {
        match value {
            CanonicalValue::String(s) => Ok(s),
            CanonicalValue::Number(n) => Ok(n.as_str().to_string()),
            other => Err(EncodingError::UnsupportedType(format!(
                "map key must be a string, got {other:?}"
            ))),
        }
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = CanonicalValue;
    type Error = EncodingError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), EncodingError> {
        self.pending_key = Some(Self::key_string(key.serialize(ValueSerializer)?)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodingError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| EncodingError::UnsupportedType("map value without a key".to_string()))?;
        self.entries.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Object(self.entries))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = CanonicalValue;
    type Error = EncodingError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodingError> {
        self.entries
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CanonicalValue, EncodingError> {
        Ok(CanonicalValue::Object(self.entries))
    }
}

pub(crate) struct SerializeStructVariant {
    variant: &'static str,
    entries: BTreeMap<String, CanonicalValue>,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = CanonicalValue;
    type Error = EncodingError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodingError> {
        self.entries
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CanonicalValue, EncodingError> {
        let mut map = BTreeMap::new();
        map.insert(
            self.variant.to_string(),
            CanonicalValue::Object(self.entries),
        );
        Ok(CanonicalValue::Object(map))
    }
}
