// Base64 утилиты

use base64::{engine::general_purpose, Engine};

pub fn encode(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

pub fn decode(data: &str) -> Result<Vec<u8>, String> {
    general_purpose::STANDARD
        .decode(data)
        .map_err(|e| format!("Base64 decode failed: {}", e))
}

/// Декодировать и проверить длину (для ключей, подписей, IV фиксированной ширины)
pub fn decode_exact(data: &str, len: usize) -> Result<Vec<u8>, String> {
    let bytes = decode(data)?;
    if bytes.len() != len {
        return Err(format!("Expected {} bytes, got {}", len, bytes.len()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_exact_rejects_wrong_length() {
        let encoded = encode(&[7u8; 31]);
        assert!(decode_exact(&encoded, 32).is_err());
        assert_eq!(decode_exact(&encoded, 31).unwrap(), vec![7u8; 31]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not base64!").is_err());
    }
}
