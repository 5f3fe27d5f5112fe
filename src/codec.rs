//! Integer-code mapping for contract enums
//!
//! The contract returns listing status and price unit as small integer codes.
//! Decoding is total only over the defined code sets; an unknown code is a
//! hard `DecodeError`, never a defaulted value, so contract drift surfaces
//! immediately instead of masquerading as an "available" listing.

use crate::types::{ListingStatus, PriceUnit};

/// Errors from decoding contract enum codes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Unknown listing status code: {0}")]
    UnknownStatusCode(u8),

    #[error("Unknown price unit code: {0}")]
    UnknownPriceUnitCode(u8),
}

/// Decode a listing status code
///
/// Known mapping: `0 => Available, 1 => Pending, 2 => Leased, 3 => Cancelled`.
pub fn decode_status(code: u8) -> Result<ListingStatus, DecodeError> {
    match code {
        0 => Ok(ListingStatus::Available),
        1 => Ok(ListingStatus::Pending),
        2 => Ok(ListingStatus::Leased),
        3 => Ok(ListingStatus::Cancelled),
        other => Err(DecodeError::UnknownStatusCode(other)),
    }
}

/// Encode a listing status to its contract code (exact inverse of decode)
pub fn encode_status(status: ListingStatus) -> u8 {
    match status {
        ListingStatus::Available => 0,
        ListingStatus::Pending => 1,
        ListingStatus::Leased => 2,
        ListingStatus::Cancelled => 3,
    }
}

/// Decode a price unit code
///
/// Known mapping: `0 => Acre, 1 => Hectare`.
pub fn decode_price_unit(code: u8) -> Result<PriceUnit, DecodeError> {
    match code {
        0 => Ok(PriceUnit::Acre),
        1 => Ok(PriceUnit::Hectare),
        other => Err(DecodeError::UnknownPriceUnitCode(other)),
    }
}

/// Encode a price unit to its contract code (exact inverse of decode)
pub fn encode_price_unit(unit: PriceUnit) -> u8 {
    match unit {
        PriceUnit::Acre => 0,
        PriceUnit::Hectare => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip_for_all_defined_values() {
        for status in [
            ListingStatus::Available,
            ListingStatus::Pending,
            ListingStatus::Leased,
            ListingStatus::Cancelled,
        ] {
            assert_eq!(decode_status(encode_status(status)).unwrap(), status);
        }
    }

    #[test]
    fn price_unit_roundtrip_for_all_defined_values() {
        for unit in [PriceUnit::Acre, PriceUnit::Hectare] {
            assert_eq!(decode_price_unit(encode_price_unit(unit)).unwrap(), unit);
        }
    }

    #[test]
    fn unknown_status_code_is_an_error_not_a_default() {
        assert_eq!(
            decode_status(4),
            Err(DecodeError::UnknownStatusCode(4)),
            "code 4 must fail, not coerce to a known status"
        );
        assert_eq!(decode_status(255), Err(DecodeError::UnknownStatusCode(255)));
    }

    #[test]
    fn unknown_price_unit_code_is_an_error() {
        assert_eq!(
            decode_price_unit(2),
            Err(DecodeError::UnknownPriceUnitCode(2))
        );
    }

    #[test]
    fn error_message_names_the_offending_code() {
        let err = decode_status(9).unwrap_err();
        assert!(err.to_string().contains('9'));
    }
}
