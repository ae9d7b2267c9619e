use std::io::Write;

use ipam_lookup::domain::ResolvedAddressRecord;
use ipam_lookup::ports::RegistryClient;
use ipam_lookup::services::ResolverService;
use ipam_lookup::{IpamLookupError, Result};

/// Resolves `ip_address`, writing the record to `out` or one diagnostic line
/// to `err`. Never fails: every error ends up as `None`.
pub async fn run<C, O, E>(
    resolver: &ResolverService<C>,
    ip_address: &str,
    out: &mut O,
    err: &mut E,
) -> Option<ResolvedAddressRecord>
where
    C: RegistryClient,
    O: Write,
    E: Write,
{
    let result = match resolver.try_resolve(ip_address).await {
        Ok(record) => emit(&record, out).map(|()| record),
        Err(e) => Err(e),
    };

    match result {
        Ok(record) => Some(record),
        Err(e) => {
            report(&e, err);
            None
        }
    }
}

pub fn emit<O: Write>(record: &ResolvedAddressRecord, out: &mut O) -> Result<()> {
    let line = record.to_json_line()?;
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

pub fn report<E: Write>(error: &IpamLookupError, err: &mut E) {
    if error.is_silent() {
        tracing::debug!(error = %error, "no result");
        return;
    }

    let line = match error {
        IpamLookupError::InvalidAddress(ip) => format!("Error: Invalid IP address format: {ip}"),
        e if e.is_config() => format!("Error: {e}"),
        e => format!("Error querying IPAM: {e}"),
    };
    let _ = writeln!(err, "{line}");
}
