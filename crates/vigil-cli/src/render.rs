//! Plain-text rendering of dashboard listings.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use vigil_core::record::{ContactMessage, EmergencyReport, Report};

const STAMP: &str = "%Y-%m-%d %H:%M";

fn stamp(at: DateTime<Utc>) -> String { at.format(STAMP).to_string() }

fn header(out: &mut String, title: &str, count: usize) {
  let line = format!("{title} ({count})");
  let _ = writeln!(out, "{line}\n{}", "─".repeat(line.chars().count()));
  if count == 0 {
    out.push_str("  nothing yet\n");
  }
}

/// Render reports, one block each, in the order the server returned them.
pub fn reports(reports: &[Report]) -> String {
  let mut out = String::new();
  header(&mut out, "Reports", reports.len());

  for r in reports {
    let _ = writeln!(out, "\n{}  {}", stamp(r.datetime), r.subject);
    let _ = writeln!(out, "  at {}", r.location);
    let _ = writeln!(out, "  {}", r.description);

    let from: Vec<&str> = [&r.name, &r.email, &r.contact]
      .into_iter()
      .filter_map(|f| f.as_deref())
      .collect();
    if !from.is_empty() {
      let _ = writeln!(out, "  from {}", from.join(", "));
    }
    if let Some(file) = &r.file_ref {
      let _ = writeln!(out, "  attachment {file}");
    }
    let _ = writeln!(out, "  id {}  received {}", r.id, stamp(r.created_at));
  }
  out
}

pub fn emergencies(emergencies: &[EmergencyReport]) -> String {
  let mut out = String::new();
  header(&mut out, "Emergencies", emergencies.len());

  for e in emergencies {
    let _ = writeln!(out, "\n{}  SOS at {}", stamp(e.created_at), e.location);
    let _ = writeln!(out, "  attachment {}", e.file_ref);
    let _ = writeln!(out, "  id {}", e.id);
  }
  out
}

pub fn contacts(messages: &[ContactMessage]) -> String {
  let mut out = String::new();
  header(&mut out, "Messages", messages.len());

  for m in messages {
    let _ = writeln!(out, "\n{}  {}", stamp(m.created_at), m.subject);
    match &m.contact {
      Some(contact) => {
        let _ = writeln!(out, "  from {} <{}>, {contact}", m.name, m.email);
      }
      None => {
        let _ = writeln!(out, "  from {} <{}>", m.name, m.email);
      }
    }
    let _ = writeln!(out, "  {}", m.message);
  }
  out
}
