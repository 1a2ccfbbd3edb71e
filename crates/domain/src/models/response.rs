//! Response envelope shared by every endpoint.

use serde::Serialize;

/// Successful response body: `{ "ok": true, ...payload }`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        mensaje: &'static str,
    }

    #[test]
    fn test_envelope_flattens_payload() {
        let value = serde_json::to_value(Envelope::new(Payload { mensaje: "hola" })).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["mensaje"], "hola");
    }
}
