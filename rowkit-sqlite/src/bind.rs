use crate::error_message_from_ptr;
use libsqlite3_sys::*;
use rowkit_core::{
    Context, Error, ParameterSet, Result, Value, format_date, format_time, format_timestamp,
};
use std::ffi::{CString, c_char, c_int, c_void};

/// Binds every parameter to the placeholder with the same name (`@name`, `:name` or `$name`).
/// Parameters the statement does not reference are skipped.
pub(crate) fn bind_parameters(statement: *mut sqlite3_stmt, params: &ParameterSet) -> Result<()> {
    unsafe {
        sqlite3_clear_bindings(statement);
    }
    for (name, value) in params {
        let index = parameter_index(statement, name)?;
        if index == 0 {
            log::trace!("Parameter `{}` is not used by the statement", name);
            continue;
        }
        bind_value(statement, index, value)
            .with_context(|| format!("Cannot bind parameter `{}` = {}", name, value))?;
    }
    Ok(())
}

fn parameter_index(statement: *mut sqlite3_stmt, name: &str) -> Result<c_int> {
    if name.starts_with(['@', ':', '$']) {
        let key = CString::new(name)?;
        return Ok(unsafe { sqlite3_bind_parameter_index(statement, key.as_ptr()) });
    }
    for prefix in ['@', ':', '$'] {
        let key = CString::new(format!("{}{}", prefix, name))?;
        let index = unsafe { sqlite3_bind_parameter_index(statement, key.as_ptr()) };
        if index != 0 {
            return Ok(index);
        }
    }
    Ok(0)
}

pub(crate) fn bind_value(statement: *mut sqlite3_stmt, index: c_int, value: &Value) -> Result<()> {
    let rc = unsafe {
        match value {
            Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int32(Some(v)) => sqlite3_bind_int(statement, index, *v),
            Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
            Value::UInt8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::UInt16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::UInt32(Some(v)) => sqlite3_bind_int64(statement, index, *v as sqlite3_int64),
            Value::UInt64(Some(v)) => {
                let Ok(v) = sqlite3_int64::try_from(*v) else {
                    return Err(Error::msg(format!(
                        "Cannot bind u64 value `{}` into sqlite integer because it's out of bounds",
                        v
                    )));
                };
                sqlite3_bind_int64(statement, index, v)
            }
            Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, *v as f64),
            Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
            Value::Decimal(Some(v)) => bind_text(statement, index, &v.to_string()),
            Value::Varchar(Some(v)) => bind_text(statement, index, v),
            Value::Blob(Some(v)) => sqlite3_bind_blob(
                statement,
                index,
                v.as_ptr() as *const c_void,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            ),
            Value::Date(Some(v)) => bind_text(statement, index, &format_date(v)?),
            Value::Time(Some(v)) => bind_text(statement, index, &format_time(v)?),
            Value::Timestamp(Some(v)) => bind_text(statement, index, &format_timestamp(v)?),
            Value::Uuid(Some(v)) => bind_text(statement, index, &v.hyphenated().to_string()),
            _ => sqlite3_bind_null(statement, index),
        }
    };
    if rc != SQLITE_OK {
        let error = unsafe {
            Error::msg(
                error_message_from_ptr(&sqlite3_errmsg(sqlite3_db_handle(statement))).to_string(),
            )
        };
        return Err(error);
    }
    Ok(())
}

fn bind_text(statement: *mut sqlite3_stmt, index: c_int, value: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            value.as_ptr() as *const c_char,
            value.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}
