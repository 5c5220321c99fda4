//! Binary COPY field framing.
//!
//! The row writer consumes each value as a length-prefixed blob. The framer
//! wraps the encoded geometry with its length and the struct-format
//! descriptor the writer expects for such a blob; the payload itself is
//! never transformed.

/// A length-prefixed binary field, ready for a binary COPY row writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyField {
    payload: Vec<u8>,
}

impl CopyField {
    pub fn new(payload: Vec<u8>) -> Self {
        CopyField { payload }
    }

    /// Struct-format descriptor for a length-prefixed blob (`i<len>s`).
    ///
    /// # Example
    ///
    /// ```
    /// use geocopy_core::CopyField;
    ///
    /// let field = CopyField::new(vec![0u8; 21]);
    /// assert_eq!(field.descriptor(), "i21s");
    /// ```
    pub fn descriptor(&self) -> String {
        format!("i{}s", self.payload.len())
    }

    /// Field length as the row writer's length prefix.
    pub fn len(&self) -> i32 {
        self.payload.len() as i32
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// On-the-wire form of the field: network-order length, then the payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.payload.len());
        out.extend_from_slice(&self.len().to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_len_and_payload() {
        let field = CopyField::new(vec![1, 2, 3]);
        assert_eq!(field.descriptor(), "i3s");
        assert_eq!(field.len(), 3);
        assert!(!field.is_empty());
        assert_eq!(field.payload(), &[1, 2, 3]);
    }

    #[test]
    fn wire_form_is_network_order_length_then_payload() {
        let field = CopyField::new(vec![0xAA, 0xBB]);
        assert_eq!(field.to_bytes(), vec![0, 0, 0, 2, 0xAA, 0xBB]);
    }

    #[test]
    fn into_payload_hands_back_the_blob() {
        let field = CopyField::new(vec![9, 9]);
        assert_eq!(field.into_payload(), vec![9, 9]);
    }
}
