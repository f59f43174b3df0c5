//! Per-site field substitution on the template's Home page
//!
//! The template layout is a positional contract:
//!
//! | section | control | content                          |
//! |---------|---------|----------------------------------|
//! | 0       | 0       | project description (HTML)       |
//! | 0       | 1       | start and delivery dates (HTML)  |
//! | 2       | 0       | proposal director widget (JSON)  |
//! | 2       | 1       | proposal manager widget (JSON)   |
//! | 2       | 2       | project location widget (JSON)   |
//!
//! A position missing from the template is skipped.

pub mod dates;
pub mod splice;

pub use dates::{format_proposal_date, ordinal, render_dates, RenderedDates};
pub use splice::replace_literals;

use thiserror::Error;
use tracing::debug;

use crate::error::{ErrorCode, ProvisionError};
use crate::message::{non_blank, PersonField, SiteInformation};
use crate::template::{CanvasControl, ClientSidePage};
use splice::json_escape;

const DETAILS_SECTION: usize = 0;
const DESCRIPTION_CONTROL: usize = 0;
const DATES_CONTROL: usize = 1;
const PEOPLE_SECTION: usize = 2;
const DIRECTOR_CONTROL: usize = 0;
const MANAGER_CONTROL: usize = 1;
const LOCATION_CONTROL: usize = 2;

/// Name and email baked into a people widget in the template
#[derive(Debug, Clone, Copy)]
pub struct PersonPlaceholder {
    pub email: &'static str,
    pub display_name: &'static str,
}

pub const MANAGER_PLACEHOLDER: PersonPlaceholder = PersonPlaceholder {
    email: "kdavies@umwelt.com.au",
    display_name: "kirsty davies",
};

pub const DIRECTOR_PLACEHOLDER: PersonPlaceholder = PersonPlaceholder {
    email: "jmerrell@umwelt.com.au",
    display_name: "John Merrell",
};

#[derive(Debug, Error)]
pub enum SubstitutionError {
    #[error("{} '{value}' is not a recognised date", .field.as_deref().unwrap_or("Date"))]
    InvalidDate {
        field: Option<String>,
        value: String,
    },
}

impl SubstitutionError {
    fn for_field(self, name: &str) -> Self {
        match self {
            Self::InvalidDate { value, .. } => Self::InvalidDate {
                field: Some(name.to_string()),
                value,
            },
        }
    }
}

impl From<SubstitutionError> for ProvisionError {
    fn from(err: SubstitutionError) -> Self {
        let field = match &err {
            SubstitutionError::InvalidDate { field, .. } => field.clone(),
        };
        ProvisionError::input_with_code(ErrorCode::INPUT_INVALID_DATE, err.to_string(), field)
            .with_source(err)
    }
}

/// Rewrite the Home page's description, dates, people and location controls
/// for one site.
///
/// Dates are rendered first so a malformed date fails before anything is
/// touched.
pub fn substitute_home_page(
    mut page: ClientSidePage,
    info: &SiteInformation,
) -> Result<ClientSidePage, SubstitutionError> {
    let dates = render_dates(info)?;

    match page.control_mut(DETAILS_SECTION, DESCRIPTION_CONTROL) {
        Some(control) => control.set_text(description_html(info.description())),
        None => debug!("Template has no description control; skipping"),
    }

    match page.control_mut(DETAILS_SECTION, DATES_CONTROL) {
        Some(control) => control.set_text(dates_html(&dates)),
        None => debug!("Template has no dates control; skipping"),
    }

    if let Some(control) = page.control_mut(PEOPLE_SECTION, MANAGER_CONTROL) {
        substitute_person(control, MANAGER_PLACEHOLDER, &info.manager());
    }

    if let Some(control) = page.control_mut(PEOPLE_SECTION, DIRECTOR_CONTROL) {
        substitute_person(control, DIRECTOR_PLACEHOLDER, &info.director());
    }

    if let Some(control) = page.control_mut(PEOPLE_SECTION, LOCATION_CONTROL) {
        substitute_location(
            control,
            non_blank(&info.project_location_name),
            non_blank(&info.project_location_address),
        );
    }

    Ok(page)
}

pub fn description_html(description: &str) -> String {
    format!(
        "<h4>Project Description -</h4><h4><span><span><span>{description}</span></span></span></h4>"
    )
}

pub fn dates_html(dates: &RenderedDates) -> String {
    format!(
        "<h4>Project Start Date -&nbsp; {}&nbsp;</h4>{:40}<br/> <h4>Delivery Date -&nbsp; {}&nbsp;</h4>",
        dates.start, "", dates.deadline
    )
}

/// Swap the placeholder identity for the real one. A blank person clears the
/// placeholders.
fn substitute_person(control: &mut CanvasControl, placeholder: PersonPlaceholder, person: &PersonField) {
    let Some(payload) = control.json_control_data.as_deref() else {
        debug!(
            "People control for {} has no JSON data; skipping",
            placeholder.display_name
        );
        return;
    };

    let updated = replace_literals(
        payload,
        &[
            (placeholder.email, json_escape(&person.email)),
            (placeholder.display_name, json_escape(&person.display_name)),
        ],
    );
    control.json_control_data = Some(updated);
}

fn substitute_location(control: &mut CanvasControl, name: Option<&str>, address: Option<&str>) {
    let Some(payload) = control.json_control_data.as_deref() else {
        return;
    };

    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(name) = name {
        let name = json_escape(name);
        pairs.push((r#""title":"""#, format!(r#""title": "{name}""#)));
        pairs.push((r#""defaultTitle":"""#, format!(r#""defaultTitle": "{name}""#)));
    }
    if let Some(address) = address {
        let address = json_escape(address);
        pairs.push((r#""defaultAddress":"""#, format!(r#""defaultAddress": "{address}""#)));
        pairs.push((r#""address":"""#, format!(r#""address": "{address}""#)));
    }

    if pairs.is_empty() {
        return;
    }
    control.json_control_data = Some(replace_literals(payload, &pairs));
}
