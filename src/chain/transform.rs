//! Raw tuple to domain listing transformation
//!
//! Converts one positional `getListing` tuple into a typed [`Listing`].
//! Field arity and types are validated strictly; a short or mistyped tuple is
//! rejected, never padded or coerced.

use crate::codec::{self, DecodeError};
use crate::types::{Listing, ListingId};

use super::{RawField, RawListing};

/// Errors from transforming a raw contract tuple
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// Tuple has the wrong number of fields
    #[error("Malformed listing tuple: expected {expected} fields, got {got}")]
    Arity { expected: usize, got: usize },

    /// A field holds an unexpected type
    #[error("Malformed listing field '{field}': expected {expected}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },

    /// An integer field does not fit its domain type
    #[error("Listing field '{field}' out of range: {value}")]
    OutOfRange { field: &'static str, value: u128 },

    /// An enum code field is outside the known code set
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// All-zero address used by the contract for "no lessee"
const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Transform one raw `getListing` tuple into a [`Listing`]
///
/// `id` is supplied by the caller since the ledger call is id-indexed but does
/// not echo the id back. `updated_at` is set equal to `created_at`: the
/// contract does not track updates separately, and this approximation is kept
/// visible here rather than hidden behind a fake timestamp.
pub fn transform_listing(id: ListingId, raw: &RawListing) -> Result<Listing, TransformError> {
    let fields = &raw.0;
    if fields.len() != RawListing::FIELD_COUNT {
        return Err(TransformError::Arity {
            expected: RawListing::FIELD_COUNT,
            got: fields.len(),
        });
    }

    let owner = address_field(&fields[0], "owner")?;
    let title = str_field(&fields[1], "title")?;
    let location = str_field(&fields[2], "location")?;
    let size = narrow_u64(uint_field(&fields[3], "size")?, "size")?;
    let price = uint_field(&fields[4], "price")?;
    let price_unit = codec::decode_price_unit(narrow_u8(
        uint_field(&fields[5], "priceUnit")?,
        "priceUnit",
    )?)?;
    let status = codec::decode_status(narrow_u8(uint_field(&fields[6], "status")?, "status")?)?;
    let description = str_field(&fields[7], "description")?;
    let features = list_field(&fields[8], "features")?;
    let created_at = narrow_u64(uint_field(&fields[9], "createdAt")?, "createdAt")?;
    let lessee = address_field(&fields[10], "lessee")?;
    let lease_end_time = narrow_u64(uint_field(&fields[11], "leaseEndTime")?, "leaseEndTime")?;

    // Zero address / zero timestamp mean "no active lease"
    let current_lessee = if lessee.is_empty() || lessee == ZERO_ADDRESS {
        None
    } else {
        Some(lessee)
    };
    let lease_end_time = if lease_end_time == 0 {
        None
    } else {
        Some(lease_end_time)
    };

    Ok(Listing {
        id,
        owner,
        title,
        location,
        size,
        price,
        price_unit,
        status,
        description,
        features,
        created_at,
        updated_at: created_at,
        current_lessee,
        lease_end_time,
    })
}

fn address_field(field: &RawField, name: &'static str) -> Result<String, TransformError> {
    match field {
        RawField::Address(s) => Ok(s.clone()),
        _ => Err(TransformError::FieldType {
            field: name,
            expected: "address",
        }),
    }
}

fn str_field(field: &RawField, name: &'static str) -> Result<String, TransformError> {
    match field {
        RawField::Str(s) => Ok(s.clone()),
        _ => Err(TransformError::FieldType {
            field: name,
            expected: "string",
        }),
    }
}

fn uint_field(field: &RawField, name: &'static str) -> Result<u128, TransformError> {
    match field {
        RawField::Uint(v) => Ok(*v),
        _ => Err(TransformError::FieldType {
            field: name,
            expected: "uint",
        }),
    }
}

fn list_field(field: &RawField, name: &'static str) -> Result<Vec<String>, TransformError> {
    match field {
        RawField::StrList(v) => Ok(v.clone()),
        _ => Err(TransformError::FieldType {
            field: name,
            expected: "string[]",
        }),
    }
}

fn narrow_u64(value: u128, field: &'static str) -> Result<u64, TransformError> {
    u64::try_from(value).map_err(|_| TransformError::OutOfRange { field, value })
}

fn narrow_u8(value: u128, field: &'static str) -> Result<u8, TransformError> {
    u8::try_from(value).map_err(|_| TransformError::OutOfRange { field, value })
}
