//! Transactional email
//!
//! Booking confirmations and the dashboard test-email action. When no SMTP
//! configuration is present the service logs a mock send and reports success;
//! confirmation email is best-effort everywhere it is used, so a failure here
//! never affects payment state.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::EmailConfig;
use crate::models::ItineraryDay;

pub struct EmailService {
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    test_recipient: String,
}

/// Content for a booking confirmation message.
#[derive(Debug, Clone)]
pub struct ConfirmationEmail {
    pub to: String,
    pub customer_name: String,
    pub resort_name: String,
    pub partner_name: String,
    pub booking_id: String,
    pub itinerary: Vec<ItineraryDay>,
}

impl EmailService {
    pub fn new(config: Option<&EmailConfig>) -> anyhow::Result<Self> {
        let Some(config) = config else {
            return Ok(Self {
                mailer: None,
                from: "AIRE Resorts <bookings@aire.example>".to_string(),
                test_recipient: "test@example.com".to_string(),
            });
        };

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            mailer: Some(builder.build()),
            from: config.from.clone(),
            test_recipient: config.test_recipient.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }

    /// Recipient for the dashboard test-email action.
    pub fn test_recipient(&self) -> &str {
        &self.test_recipient
    }

    pub async fn send_booking_confirmation(&self, email: &ConfirmationEmail) -> anyhow::Result<()> {
        let subject = format!("Your AI-Generated Itinerary for {}", email.resort_name);
        self.send_html(&email.to, &subject, &render_confirmation(email)).await
    }

    pub async fn send_test_email(&self, email: &ConfirmationEmail) -> anyhow::Result<()> {
        let subject = format!("[TEST] Your AI-Generated Itinerary for {}", email.resort_name);
        self.send_html(&email.to, &subject, &render_confirmation(email)).await
    }

    async fn send_html(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let Some(mailer) = &self.mailer else {
            info!(to = %to, subject = %subject, "Email not configured, mock send");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;

        mailer.send(message).await?;
        info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

fn render_confirmation(email: &ConfirmationEmail) -> String {
    let mut days = String::new();
    for day in &email.itinerary {
        let activities = day
            .activities
            .iter()
            .map(|a| format!("<li>{}</li>", a))
            .collect::<String>();

        days.push_str(&format!(
            "<h3>Day {}: {}</h3><ul>{}</ul>\
             <p>Breakfast: {} &middot; Lunch: {} &middot; Dinner: {}</p>",
            day.day,
            day.title,
            activities,
            day.dining.breakfast,
            day.dining.lunch,
            day.dining.dinner,
        ));
    }

    format!(
        "<html><body>\
         <h1>Your stay at {resort}</h1>\
         <p>Dear {customer},</p>\
         <p>Thank you for booking with {partner}. Your bespoke five-day \
         itinerary is below.</p>\
         {days}\
         <p>Booking reference: {booking_id}</p>\
         </body></html>",
        resort = email.resort_name,
        customer = email.customer_name,
        partner = email.partner_name,
        days = days,
        booking_id = email.booking_id,
    )
}
