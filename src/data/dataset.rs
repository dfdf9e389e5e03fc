//! Named collections of fields.

use std::collections::BTreeMap;

use crate::data::field::Field;
use crate::mesh_error::MeshError;
use crate::topology::location::Location;

/// A set of fields keyed by name.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dataset {
    fields: BTreeMap<String, Field>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field under its own name, returning any field it replaces.
    pub fn insert(&mut self, field: Field) -> Option<Field> {
        self.fields.insert(field.name.clone(), field)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Field> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Check every field's shape and that its location dimensions have the
    /// lengths given by `count`.
    pub fn check_against<F>(&self, count: F) -> Result<(), MeshError>
    where
        F: Fn(Location) -> usize,
    {
        for field in self.iter() {
            field.check_shape()?;
            for dim in field.dims() {
                if let Some(loc) = dim.as_location() {
                    if dim.len != count(loc) {
                        return Err(MeshError::FieldShape {
                            name: field.name.clone(),
                            reason: format!(
                                "{loc} dimension has {} entries but the mesh has {}",
                                dim.len,
                                count(loc)
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Field> for Dataset {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut ds = Dataset::new();
        for f in iter {
            ds.insert(f);
        }
        ds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::field::FieldValues;

    #[test]
    fn check_against_counts() {
        let ds: Dataset = [Field::on_location(
            "area",
            Location::Cell,
            FieldValues::F64(vec![1.0, 2.0]),
        )]
        .into_iter()
        .collect();
        assert!(ds.check_against(|_| 2).is_ok());
        assert!(ds.check_against(|_| 3).is_err());
    }
}
