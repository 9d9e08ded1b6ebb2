use std::io::Read;
use serde::{Serialize, Deserialize};
use serde_yaml::{Value, Mapping, to_value, from_value, from_str, from_reader};




// ============================================================================
#[derive(thiserror::Error, Debug)]
pub enum Error {

    #[error("{0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("patch '{0}' is not of the form key.path=value")]
    MalformedKeyVal(String),
}




// ============================================================================
fn merge_mapping(value_map: &Mapping, patch_map: &Mapping) -> Mapping {
    let mut result = value_map.clone();

    for (key, patch_value) in patch_map {
        let new_value = merge_value(value_map.get(key).unwrap_or(&Value::Null), patch_value);
        result.insert(key.clone(), new_value);
    }
    result
}

fn merge_value(value: &Value, patch: &Value) -> Value {
    if let (Some(value_map), Some(patch_map)) = (value.as_mapping(), patch.as_mapping()) {
        Value::from(merge_mapping(value_map, patch_map))
    } else {
        patch.clone()
    }
}




/**
 * Turn `a.b.c=value` into the nested mapping `{a: {b: {c: value}}}`. The
 * value is parsed as YAML, so numbers and booleans keep their types.
 */
fn nest_key_val(key_val: &str) -> Result<Value, Error> {
    let (path, value) = match key_val.find('=') {
        Some(i) if i > 0 => (&key_val[..i], &key_val[i + 1..]),
        _ => return Err(Error::MalformedKeyVal(key_val.to_string())),
    };
    if path.split('.').any(str::is_empty) {
        return Err(Error::MalformedKeyVal(key_val.to_string()))
    }
    let leaf: Value = if value.is_empty() { Value::Null } else { from_str(value)? };

    Ok(path.rsplit('.').fold(leaf, |inner, key| {
        let mut map = Mapping::new();
        map.insert(Value::from(key), inner);
        Value::from(map)
    }))
}




/**
 * Extends anything that is Clone, Serialize, and Deserialize to have mutable
 * "patch" methods, accepting YAML documents or `key.path=value` strings.
 */
pub trait Patch {
    fn patch_from_value(&mut self, patch_value: &Value) -> Result<(), Error>;

    fn patch_from_str(&mut self, yaml_str: &str) -> Result<(), Error> {
        self.patch_from_value(&from_str(yaml_str)?)
    }

    fn patch_from_reader<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        self.patch_from_value(&from_reader(reader)?)
    }

    fn patch_from_key_val(&mut self, key_val: &str) -> Result<(), Error> {
        self.patch_from_value(&nest_key_val(key_val)?)
    }
}




// ============================================================================
impl<T> Patch for T where T: Clone + Serialize + for<'de> Deserialize<'de> {
    fn patch_from_value(&mut self, patch_value: &Value) -> Result<(), Error> {
        let self_value = to_value(self.clone())?;
        let merged: T = from_value(merge_value(&self_value, patch_value))?;
        *self = merged;
        Ok(())
    }
}
