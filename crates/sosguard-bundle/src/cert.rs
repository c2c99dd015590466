use camino::Utf8Path;
use sosguard_expr::Certificate;
use std::io;
use std::process::Command;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

/// Read the `notAfter` date of the PEM/DER certificate at `abs` with
/// `openssl x509`.
pub(crate) fn read_certificate(
    abs: &Utf8Path,
    path: &str,
    now: OffsetDateTime,
) -> io::Result<Certificate> {
    if !abs.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no certificate at {path}"),
        ));
    }

    let output = Command::new("openssl")
        .args(["x509", "-noout", "-enddate", "-in"])
        .arg(abs.as_str())
        .output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(%path, stderr = %stderr.trim(), "openssl rejected certificate");
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("openssl x509 failed for {path}"),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let expiry = parse_enddate(&stdout)?;
    Ok(certificate(path, expiry, now))
}

/// Parse `notAfter=Jan  1 00:00:00 2030 GMT` as printed by `openssl x509 -enddate`.
pub(crate) fn parse_enddate(output: &str) -> io::Result<OffsetDateTime> {
    let invalid = |msg: String| io::Error::new(io::ErrorKind::InvalidData, msg);

    let raw = output
        .lines()
        .find_map(|l| l.trim().strip_prefix("notAfter="))
        .ok_or_else(|| invalid(format!("no notAfter in {:?}", output.trim())))?;

    // openssl pads single-digit days with a space; collapse before parsing.
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let format = format_description!(
        "[month repr:short] [day padding:none] [hour]:[minute]:[second] [year] GMT"
    );
    PrimitiveDateTime::parse(&normalized, format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|err| invalid(format!("bad notAfter {raw:?}: {err}")))
}

fn certificate(path: &str, expiry: OffsetDateTime, now: OffsetDateTime) -> Certificate {
    let date = expiry.date();
    Certificate {
        path: path.to_string(),
        expiry_date: format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        ),
        days_to_expire: (expiry - now).whole_days(),
    }
}
