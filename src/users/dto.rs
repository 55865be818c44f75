use serde::{Deserialize, Deserializer, Serialize};

/// A field of a partial update: missing, explicit `null`, or a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

// Only reached when the key is present; `#[serde(default)]` covers `Absent`.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Request body for `POST /users`. Required-ness is checked by validation so
/// a missing field is reported the same way as an invalid one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub age: Option<i16>,
    pub phone_number: Option<String>,
}

/// Request body for `PATCH /users/:id`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub address: Patch<String>,
    #[serde(default)]
    pub age: Patch<i16>,
    #[serde(default)]
    pub phone_number: Patch<String>,
}

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
pub struct Pong {
    pub message: &'static str,
}
