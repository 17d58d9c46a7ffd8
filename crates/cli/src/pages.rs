//! Static information pages reachable from the main menu.

use std::io::{self, Write};

pub struct InfoPage {
    pub title: &'static str,
    pub lines: &'static [&'static str],
}

impl InfoPage {
    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "\n{}:", self.title)?;
        for line in self.lines {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

pub const EMERGENCY_SERVICES: InfoPage = InfoPage {
    title: "Emergency Services Information",
    lines: &[
        "- For immediate medical emergencies, dial 911",
        "- Poison Control Center: 1-800-222-1222",
        "- Local Emergency Room: contact your nearest hospital",
        "- 24/7 Nurse Hotline: see the number on your insurance card",
    ],
};

pub const NEAREST_FACILITIES: InfoPage = InfoPage {
    title: "Find Nearest Healthcare Facilities",
    lines: &[
        "To find the nearest healthcare facilities, please visit:",
        "https://www.healthcarefacilityfinder.com",
        "Enter your location to see a list of nearby hospitals, clinics, and pharmacies.",
    ],
};

pub const COVID19: InfoPage = InfoPage {
    title: "COVID-19 Information and Updates",
    lines: &[
        "For the latest information on COVID-19, please visit:",
        "- CDC: https://www.cdc.gov/coronavirus/2019-ncov/index.html",
        "- WHO: https://www.who.int/emergencies/diseases/novel-coronavirus-2019",
        "- Your local health department website",
    ],
};

pub const HEALTH_TIPS: InfoPage = InfoPage {
    title: "General Health Tips",
    lines: &[
        "1. Stay hydrated by drinking at least 8 glasses of water daily.",
        "2. Eat a balanced diet rich in fruits, vegetables, and whole grains.",
        "3. Exercise regularly, aiming for at least 150 minutes of moderate activity per week.",
        "4. Get 7-9 hours of sleep each night.",
        "5. Practice good hygiene, including regular handwashing.",
        "6. Manage stress through relaxation techniques or hobbies.",
        "7. Avoid smoking and limit alcohol consumption.",
        "8. Schedule regular check-ups with your healthcare provider.",
    ],
};

pub const VACCINATION: InfoPage = InfoPage {
    title: "Vaccination Information",
    lines: &[
        "For comprehensive vaccination information, please visit:",
        "- CDC Vaccines and Immunizations: https://www.cdc.gov/vaccines/index.html",
        "- WHO Immunization: https://www.who.int/health-topics/vaccines-and-immunization",
        "Contact your healthcare provider or local health department for personalized vaccination recommendations.",
    ],
};

pub const MENTAL_HEALTH: InfoPage = InfoPage {
    title: "Mental Health Resources",
    lines: &[
        "- National Suicide Prevention Lifeline: 1-800-273-TALK (8255)",
        "- Crisis Text Line: Text HOME to 741741",
        "- SAMHSA's National Helpline: 1-800-662-HELP (4357)",
        "- National Alliance on Mental Illness (NAMI): https://www.nami.org",
        "- Mental Health America: https://www.mhanational.org",
    ],
};

pub const FIRST_AID: InfoPage = InfoPage {
    title: "First Aid Guidelines",
    lines: &[
        "For comprehensive first aid information, visit:",
        "- Red Cross First Aid: https://www.redcross.org/take-a-class/first-aid",
        "- Mayo Clinic First Aid Guide: https://www.mayoclinic.org/first-aid",
        "In case of serious injuries or life-threatening situations, always call emergency services immediately.",
    ],
};

pub const CONTACT_US: InfoPage = InfoPage {
    title: "Contact Us",
    lines: &[
        "For general inquiries:",
        "- Email: info@healthlinksystem.com",
        "",
        "For technical support:",
        "- Email: support@healthlinksystem.com",
    ],
};
