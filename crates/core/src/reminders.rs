//! Appointment reminder delivery.
//!
//! Scheduling or rescheduling an appointment produces an [`AppointmentNotice`]. The notice is
//! turned into a [`ReminderMessage`] and handed to a [`ReminderSender`]. The production sender
//! is [`OutboxSender`], which drops one RFC 822 style text file per message into the outbox
//! directory for the mail relay to pick up.
//!
//! Delivery never fails the scheduling itself: problems are logged and reported back as
//! [`ReminderOutcome::Failed`].

use crate::{MediLinkError, MediLinkResult};
use chrono::{NaiveDate, Utc};
use medilink_types::EmailAddress;
use std::fs;
use std::path::{Path, PathBuf};

pub const REMINDER_SUBJECT: &str = "Appointment Reminder";

/// Produced by the registry when an appointment is booked or moved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppointmentNotice {
    pub patient_name: String,
    pub email: Option<EmailAddress>,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReminderMessage {
    pub from: EmailAddress,
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

impl ReminderMessage {
    pub fn appointment(from: EmailAddress, to: EmailAddress, date: NaiveDate) -> Self {
        Self {
            from,
            to,
            subject: REMINDER_SUBJECT.to_string(),
            body: format!("Reminder: Your appointment is scheduled for {date}."),
        }
    }

    /// Renders headers and body as a plain-text mail message.
    pub fn render(&self) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\n\r\n{}\r\n",
            self.from,
            self.to,
            self.subject,
            Utc::now().to_rfc2822(),
            self.body
        )
    }
}

/// Where reminder messages go.
pub trait ReminderSender {
    fn send(&self, message: &ReminderMessage) -> MediLinkResult<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReminderOutcome {
    Queued { to: EmailAddress },
    NoEmail,
    Failed(String),
}

/// Writes each message to its own file under an outbox directory.
#[derive(Clone, Debug)]
pub struct OutboxSender {
    outbox_dir: PathBuf,
}

impl OutboxSender {
    pub fn new(outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            outbox_dir: outbox_dir.into(),
        }
    }

    pub fn outbox_dir(&self) -> &Path {
        &self.outbox_dir
    }
}

impl ReminderSender for OutboxSender {
    fn send(&self, message: &ReminderMessage) -> MediLinkResult<()> {
        fs::create_dir_all(&self.outbox_dir).map_err(MediLinkError::DataDirCreation)?;

        let recipient: String = message
            .to
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.9f");
        let path = self.outbox_dir.join(format!("{stamp}-{recipient}.eml"));

        fs::write(&path, message.render()).map_err(MediLinkError::FileWrite)?;
        tracing::info!("reminder queued: {}", path.display());
        Ok(())
    }
}

/// Sends the reminder for `notice`, if the patient has an email address.
pub fn deliver_appointment_reminder(
    sender: &dyn ReminderSender,
    from: &EmailAddress,
    notice: &AppointmentNotice,
) -> ReminderOutcome {
    let Some(to) = notice.email.clone() else {
        tracing::debug!(
            "no email for {}; appointment reminder not sent",
            notice.patient_name
        );
        return ReminderOutcome::NoEmail;
    };

    let message = ReminderMessage::appointment(from.clone(), to.clone(), notice.date);
    match sender.send(&message) {
        Ok(()) => ReminderOutcome::Queued { to },
        Err(e) => {
            tracing::error!(
                "failed to send appointment reminder to {}: {}",
                notice.patient_name,
                e
            );
            ReminderOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct RecordingSender {
        sent: RefCell<Vec<ReminderMessage>>,
        fail: bool,
    }

    impl ReminderSender for RecordingSender {
        fn send(&self, message: &ReminderMessage) -> MediLinkResult<()> {
            if self.fail {
                return Err(MediLinkError::ReminderDelivery("relay unavailable".into()));
            }
            self.sent.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    fn notice(email: Option<&str>) -> AppointmentNotice {
        AppointmentNotice {
            patient_name: "Jane".into(),
            email: email.map(|e| EmailAddress::parse(e).unwrap()),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    }

    fn from() -> EmailAddress {
        EmailAddress::parse("no-reply@healthlink.com").unwrap()
    }

    #[test]
    fn no_email_means_no_message() {
        let sender = RecordingSender {
            sent: RefCell::new(vec![]),
            fail: false,
        };
        let outcome = deliver_appointment_reminder(&sender, &from(), &notice(None));
        assert_eq!(outcome, ReminderOutcome::NoEmail);
        assert!(sender.sent.borrow().is_empty());
    }

    #[test]
    fn message_carries_date_and_subject() {
        let sender = RecordingSender {
            sent: RefCell::new(vec![]),
            fail: false,
        };
        let outcome =
            deliver_appointment_reminder(&sender, &from(), &notice(Some("jane@example.org")));
        assert!(matches!(outcome, ReminderOutcome::Queued { .. }));

        let sent = sender.sent.borrow();
        assert_eq!(sent[0].subject, "Appointment Reminder");
        assert_eq!(
            sent[0].body,
            "Reminder: Your appointment is scheduled for 2025-03-14."
        );
    }

    #[test]
    fn sender_failure_is_reported_not_raised() {
        let sender = RecordingSender {
            sent: RefCell::new(vec![]),
            fail: true,
        };
        let outcome =
            deliver_appointment_reminder(&sender, &from(), &notice(Some("jane@example.org")));
        assert!(matches!(outcome, ReminderOutcome::Failed(reason) if reason.contains("relay")));
    }

    #[test]
    fn outbox_sender_writes_message_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let sender = OutboxSender::new(temp_dir.path().join("outbox"));

        deliver_appointment_reminder(&sender, &from(), &notice(Some("jane@example.org")));

        let files: Vec<_> = fs::read_dir(sender.outbox_dir())
            .expect("outbox should exist")
            .flatten()
            .collect();
        assert_eq!(files.len(), 1);
        let content = fs::read_to_string(files[0].path()).unwrap();
        assert!(content.contains("To: jane@example.org"));
        assert!(content.contains("Subject: Appointment Reminder"));
    }
}
