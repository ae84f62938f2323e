//! iCalendar serialization of one duty invite.
//!
//! # Responsibility
//! - Render a single-VEVENT calendar with one DISPLAY alarm.
//! - Derive the download file name for the invite.
//!
//! # Invariants
//! - Content lines, CRLF endings and 75-octet folding come from the `ics`
//!   writer.
//! - Event times are floating local times (no `Z`, no `TZID`).
//! - `DTSTAMP` is the caller-supplied UTC instant.
//! - `invite_file_name` yields a single path component.

use super::window::InviteWindow;
use crate::model::duty::DutyWithUser;
use chrono::NaiveDateTime;
use ics::parameters::{PartStat, Role, CN, RSVP};
use ics::properties::{
    Attendee, CalScale, Categories, Description, DtEnd, DtStart, Method, Organizer as OrganizerProp,
    Status, Summary, Transp, Trigger,
};
use ics::components::Property;
use ics::{escape_text, Alarm, Event, ICalendar};

const PRODID: &str = "-//dutycal//Duty Calendar//EN";
const CATEGORY: &str = "Duty Calendar";
const FLOATING_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Organizer shown on generated invites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organizer {
    pub name: String,
    pub email: String,
}

impl Default for Organizer {
    fn default() -> Self {
        Self {
            name: "Duty Calendar".to_string(),
            email: "duty@example.com".to_string(),
        }
    }
}

/// Renders the `.ics` document for `duty` over `window`.
pub fn render_ics(
    duty: &DutyWithUser,
    window: &InviteWindow,
    organizer: &Organizer,
    stamp_utc: NaiveDateTime,
) -> String {
    let rubric = duty.rubric();
    let user = &duty.user;

    let mut event = Event::new(
        format!("{}@dutycal", duty.id()),
        stamp_utc.format(UTC_FORMAT).to_string(),
    );
    event.push(DtStart::new(window.start.format(FLOATING_FORMAT).to_string()));
    event.push(DtEnd::new(window.end.format(FLOATING_FORMAT).to_string()));
    event.push(Summary::new(text(&format!("{rubric} Duty"))));
    event.push(Description::new(text(&format!(
        "{} is on {rubric} duty",
        user.name
    ))));

    let mut organizer_prop = OrganizerProp::new(format!("mailto:{}", organizer.email));
    organizer_prop.add(CN::new(common_name(&organizer.name)));
    event.push(organizer_prop);

    let mut attendee = Attendee::new(format!("mailto:{}", user.email));
    attendee.add(RSVP::True);
    attendee.add(PartStat::ACCEPTED);
    attendee.add(Role::REQ_PARTICIPANT);
    attendee.add(CN::new(common_name(&user.name)));
    event.push(attendee);

    event.push(Status::confirmed());
    event.push(Transp::opaque());
    event.push(Property::new("X-MICROSOFT-CDO-BUSYSTATUS", "BUSY"));
    event.push(Categories::new(text(CATEGORY)));
    event.add_alarm(Alarm::display(
        Trigger::new(format!("-PT{}M", window.reminder_offset_minutes)),
        Description::new(text(&format!("{rubric} Duty Reminder"))),
    ));

    let mut calendar = ICalendar::new("2.0", PRODID);
    calendar.push(CalScale::new("GREGORIAN"));
    calendar.push(Method::new("PUBLISH"));
    calendar.add_event(event);
    calendar.to_string()
}

/// `{rubric}_{YYYY-MM-DD}_{userName}.ics`, whitespace runs in the name as `_`.
///
/// Path separators and other characters rejected by common file systems are
/// replaced with `_` in both the rubric and the user name, and leading dots
/// are dropped.
pub fn invite_file_name(duty: &DutyWithUser) -> String {
    let user_name = duty.user.name.split_whitespace().collect::<Vec<_>>().join("_");
    format!(
        "{}_{}_{}.ics",
        file_name_part(duty.rubric()),
        duty.date(),
        file_name_part(&user_name)
    )
}

fn text(value: &str) -> String {
    escape_text(value).into_owned()
}

/// `CN` value with DQUOTE and controls dropped, quoted when it holds `:;,`.
fn common_name(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|ch| *ch != '"' && !ch.is_control())
        .collect();
    if cleaned.contains([':', ';', ',']) {
        format!("\"{cleaned}\"")
    } else {
        cleaned
    }
}

fn file_name_part(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();
    replaced.trim_start_matches('.').to_string()
}
