//! Reading documents so numeric scalars keep their source text.
//!
//! A first pass parses the document into a [`Value`] to learn its shape. A
//! second pass re-reads the same text guided by that shape and asks for the
//! raw string at every numeric scalar, so `1.10` stays `1.10` instead of
//! becoming the float `1.1`. Booleans, nulls and tagged nodes keep their
//! typed form.

use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// Parses `content` into a [`Value`] with numeric scalars kept as strings.
pub(crate) fn parse(content: &str) -> Result<Value, serde_yaml::Error> {
    let shape: Value = serde_yaml::from_str(content)?;
    Shaped(&shape).deserialize(serde_yaml::Deserializer::from_str(content))
}

struct Shaped<'s>(&'s Value);

impl<'de> DeserializeSeed<'de> for Shaped<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        match self.0 {
            Value::Mapping(shape) => deserializer.deserialize_map(MapShape(shape)),
            Value::Sequence(shape) => deserializer.deserialize_seq(SeqShape(shape)),
            Value::Number(_) => deserializer.deserialize_str(SourceText),
            _ => Value::deserialize(deserializer),
        }
    }
}

struct MapShape<'s>(&'s Mapping);

impl<'de> Visitor<'de> for MapShape<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut out = Mapping::with_capacity(self.0.len());
        for (key, value) in self.0 {
            let Some(key) = map.next_key_seed(Shaped(key))? else {
                return Err(de::Error::invalid_length(out.len(), &self));
            };
            let value = map.next_value_seed(Shaped(value))?;
            let _ = out.insert(key, value);
        }
        Ok(Value::Mapping(out))
    }
}

struct SeqShape<'s>(&'s [Value]);

impl<'de> Visitor<'de> for SeqShape<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut out = Vec::with_capacity(self.0.len());
        for item in self.0 {
            let Some(value) = seq.next_element_seed(Shaped(item))? else {
                return Err(de::Error::invalid_length(out.len(), &self));
            };
            out.push(value);
        }
        Ok(Value::Sequence(out))
    }
}

struct SourceText;

impl Visitor<'_> for SourceText {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar")
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(v.to_owned()))
    }
}
