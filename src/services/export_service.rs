use crate::{models::User, utils::error::AppError};

pub const CSV_HEADER: [&str; 7] = [
    "firstName",
    "lastName",
    "email",
    "mobile",
    "gender",
    "status",
    "location",
];

/// Renders users as CSV: a header row, then one row per user in
/// `CSV_HEADER` order. Ids and profile paths are not exported.
pub fn users_to_csv(users: &[User]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for user in users {
        writer.write_record([
            user.first_name.as_str(),
            user.last_name.as_str(),
            user.email.as_str(),
            user.mobile.as_str(),
            user.gender.as_str(),
            user.status.as_str(),
            user.location.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))
}
