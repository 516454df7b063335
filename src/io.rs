use crate::model::{
    DepartmentId, Doctor, DoctorId, DoctorStatus, LeaveStatus, LeaveWindow, Schedule,
};
use crate::scheduler::{Catalog, Conflict, RosterResponse};
use anyhow::{bail, Context};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Import de médecins depuis CSV: header `id,name,title,department_id[,status]`
pub fn import_doctors_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Doctor>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = parse_id(rec.get(0).context("missing id")?)?;
        let name = rec.get(1).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid doctor row {id} (empty name)");
        }
        let title = rec.get(2).unwrap_or("").trim();
        let department = parse_id(rec.get(3).context("missing department_id")?)
            .with_context(|| format!("invalid department for doctor {id}"))?;
        let mut doctor = Doctor::new(DoctorId::new(id), name, DepartmentId::new(department))
            .with_title(title);
        if let Some(status) = rec.get(4).map(str::trim).filter(|s| !s.is_empty()) {
            doctor.status = parse_doctor_status(status)
                .with_context(|| format!("invalid status for doctor {id}"))?;
        }
        out.push(doctor);
    }
    Ok(out)
}

/// Import de congés: header `doctor_id,start,end[,status]`. Une date de fin
/// nue est incluse (la fenêtre s'arrête le lendemain à minuit).
pub fn import_leaves_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<LeaveWindow>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let doctor = DoctorId::new(parse_id(rec.get(0).context("missing doctor_id")?)?);
        let (start, _) = parse_point(rec.get(1).context("missing start")?.trim())?;
        let (mut end, end_was_date) = parse_point(rec.get(2).context("missing end")?.trim())?;
        if end_was_date {
            end += Duration::days(1);
        }
        let mut leave = LeaveWindow::new(doctor, start, end)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid leave for doctor {doctor}"))?;
        if let Some(status) = rec.get(3).map(str::trim).filter(|s| !s.is_empty()) {
            leave.status = parse_leave_status(status)
                .with_context(|| format!("invalid leave status for doctor {doctor}"))?;
        }
        out.push(leave);
    }
    Ok(out)
}

fn parse_id(raw: &str) -> anyhow::Result<u32> {
    raw.trim()
        .parse::<u32>()
        .with_context(|| format!("invalid id: {raw}"))
}

fn parse_doctor_status(s: &str) -> anyhow::Result<DoctorStatus> {
    match s.to_ascii_lowercase().as_str() {
        "active" | "1" | "true" | "yes" => Ok(DoctorStatus::Active),
        "inactive" | "0" | "false" | "no" => Ok(DoctorStatus::Inactive),
        _ => bail!("expected active or inactive"),
    }
}

fn parse_leave_status(s: &str) -> anyhow::Result<LeaveStatus> {
    match s.to_ascii_lowercase().as_str() {
        "approved" => Ok(LeaveStatus::Approved),
        "pending" => Ok(LeaveStatus::Pending),
        "rejected" => Ok(LeaveStatus::Rejected),
        _ => bail!("expected approved, pending or rejected"),
    }
}

/// Date-heure locale, ou date nue (minuit) signalée par le booléen.
fn parse_point(raw: &str) -> anyhow::Result<(NaiveDateTime, bool)> {
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Ok((dt, false));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok((dt, false));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date/datetime: {raw}"))?;
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .context("invalid midnight conversion")?;
    Ok((datetime, true))
}

/// Export JSON d'une réponse de génération (jolie mise en forme)
pub fn export_response_json<P: AsRef<Path>>(path: P, response: &RosterResponse) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(response)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des plannings:
/// header `id,date,slot,doctor_id,doctor,location,total_slots,booked_slots,fee,status,remarks`
pub fn export_schedules_csv<P: AsRef<Path>>(
    path: P,
    schedules: &[Schedule],
    catalog: &Catalog,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "date",
        "slot",
        "doctor_id",
        "doctor",
        "location",
        "total_slots",
        "booked_slots",
        "fee",
        "status",
        "remarks",
    ])?;
    let mut doctor_buf = itoa::Buffer::new();
    let mut total_buf = itoa::Buffer::new();
    let mut booked_buf = itoa::Buffer::new();
    for s in schedules {
        let date = s.date.to_string();
        let fee = s.fee.to_string();
        w.write_record([
            s.id.as_str(),
            date.as_str(),
            catalog.slot_name(s.slot).as_str(),
            doctor_buf.format(s.doctor.get()),
            catalog.doctor_name(s.doctor).as_str(),
            catalog.location_name(s.location).as_str(),
            total_buf.format(s.total_slots),
            booked_buf.format(s.booked_slots),
            fee.as_str(),
            s.status.as_str(),
            s.remarks.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Écrit les conflits en CSV: header `kind,doctor_id,doctor,date,slot,schedule_a,schedule_b,suggestion`
pub fn write_conflicts_csv<W: Write>(writer: W, conflicts: &[Conflict]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record([
        "kind",
        "doctor_id",
        "doctor",
        "date",
        "slot",
        "schedule_a",
        "schedule_b",
        "suggestion",
    ])?;
    let mut doctor_buf = itoa::Buffer::new();
    for c in conflicts {
        let date = c.date.to_string();
        let id_at = |i: usize| c.schedule_ids.get(i).map(|id| id.as_str()).unwrap_or("");
        w.write_record([
            c.kind.as_str(),
            doctor_buf.format(c.doctor_id.get()),
            c.doctor_name.as_str(),
            date.as_str(),
            c.slot_name.as_str(),
            id_at(0),
            id_at(1),
            c.suggestion.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_conflicts_csv<P: AsRef<Path>>(path: P, conflicts: &[Conflict]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_conflicts_csv(file, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_dates_are_midnight() {
        let (dt, was_date) = parse_point("2025-04-02").unwrap();
        assert!(was_date);
        assert_eq!(dt.to_string(), "2025-04-02 00:00:00");

        let (dt, was_date) = parse_point("2025-04-02T13:30:00").unwrap();
        assert!(!was_date);
        assert_eq!(dt.to_string(), "2025-04-02 13:30:00");

        assert!(parse_point("02/04/2025").is_err());
    }

    #[test]
    fn statuses_are_case_insensitive() {
        assert_eq!(parse_doctor_status("Inactive").unwrap(), DoctorStatus::Inactive);
        assert_eq!(parse_leave_status("PENDING").unwrap(), LeaveStatus::Pending);
        assert!(parse_leave_status("maybe").is_err());
    }
}
