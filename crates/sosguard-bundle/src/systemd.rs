use sosguard_expr::SystemdUnit;
use std::collections::BTreeMap;

/// `systemctl list-unit-files` output, relative to the bundle root.
pub const UNIT_FILES_LISTING: &str = "sos_commands/systemd/systemctl_list-unit-files";

/// `systemctl list-units --all` output, relative to the bundle root.
pub const UNITS_LISTING: &str = "sos_commands/systemd/systemctl_list-units";

/// Merge both listings by unit name. A unit in either listing exists.
pub(crate) fn parse_listings(
    unit_files: Option<&str>,
    units: Option<&str>,
) -> BTreeMap<String, SystemdUnit> {
    let mut out: BTreeMap<String, SystemdUnit> = BTreeMap::new();

    for (name, state) in unit_files.map(parse_unit_files).unwrap_or_default() {
        out.entry(name.clone())
            .or_insert_with(|| unit(name))
            .state = Some(state);
    }

    for row in units.map(parse_units).unwrap_or_default() {
        let entry = out
            .entry(row.name.clone())
            .or_insert_with(|| unit(row.name.clone()));
        entry.load_state = Some(row.load);
        entry.active_state = Some(row.active);
        entry.sub_state = Some(row.sub);
    }

    out
}

fn unit(name: String) -> SystemdUnit {
    SystemdUnit {
        name,
        ..SystemdUnit::default()
    }
}

/// `UNIT FILE  STATE  [VENDOR PRESET]` rows.
fn parse_unit_files(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("UNIT FILE") && !l.ends_with("listed."))
        .filter_map(|l| {
            let mut fields = l.split_whitespace();
            let name = fields.next()?;
            let state = fields.next()?;
            Some((name.to_string(), state.to_string()))
        })
        .collect()
}

struct UnitRow {
    name: String,
    load: String,
    active: String,
    sub: String,
}

/// `UNIT LOAD ACTIVE SUB DESCRIPTION` rows, up to the legend.
fn parse_units(text: &str) -> Vec<UnitRow> {
    let mut rows = Vec::new();
    let mut started = false;
    for line in text.lines() {
        let line = line.trim_start_matches(['●', '*', ' ', '\t']).trim_end();
        if line.is_empty() {
            if started {
                // The legend and the "N loaded units listed" footer follow.
                break;
            }
            continue;
        }
        started = true;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || fields[0] == "UNIT" {
            continue;
        }
        rows.push(UnitRow {
            name: fields[0].to_string(),
            load: fields[1].to_string(),
            active: fields[2].to_string(),
            sub: fields[3].to_string(),
        });
    }
    rows
}
