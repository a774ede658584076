//! Column type classification

use sqlparser::ast::DataType;

/// Whether `data_type` is an integer type, including the PostgreSQL serial
/// pseudo-types.
pub fn is_integer(data_type: &DataType) -> bool {
    match data_type {
        DataType::TinyInt(_)
        | DataType::UnsignedTinyInt(_)
        | DataType::SmallInt(_)
        | DataType::UnsignedSmallInt(_)
        | DataType::Int2(_)
        | DataType::MediumInt(_)
        | DataType::UnsignedMediumInt(_)
        | DataType::Int(_)
        | DataType::UnsignedInt(_)
        | DataType::Integer(_)
        | DataType::UnsignedInteger(_)
        | DataType::Int4(_)
        | DataType::BigInt(_)
        | DataType::UnsignedBigInt(_)
        | DataType::Int8(_) => true,
        DataType::Custom(name, _) => matches!(
            name.to_string().to_lowercase().as_str(),
            "serial" | "serial4" | "bigserial" | "serial8" | "smallserial" | "serial2"
        ),
        _ => false,
    }
}

/// Whether the type carries the MySQL `UNSIGNED` attribute
pub fn is_unsigned(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::UnsignedTinyInt(_)
            | DataType::UnsignedSmallInt(_)
            | DataType::UnsignedMediumInt(_)
            | DataType::UnsignedInt(_)
            | DataType::UnsignedInteger(_)
            | DataType::UnsignedBigInt(_)
    )
}

/// Get a human-readable name for a column type
pub fn display_name(data_type: &DataType) -> String {
    data_type.to_string().to_lowercase()
}
