/// Where calendar feeds live when nothing is configured (`<base>/<slug>.ics`).
pub const DEFAULT_ICS_BASE: &str = "/availability";

/// Where the JSON snapshot lives when nothing is configured.
pub const DEFAULT_SNAPSHOT: &str = "/data/availability.json";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Keywords in a summary or description that mark an event as an option.
pub const OPTION_KEYWORDS: [&str; 3] = ["option", "tentative", "pre-book"];

/// The chalet catalogue used when no properties are configured: (slug, name).
pub const DEFAULT_PROPERTIES: [(&str, &str); 19] = [
    ("alice", "Alice"),
    ("anemones", "Anémones"),
    ("bestview", "Bestview"),
    ("blanchot", "Blanchot"),
    ("cahokia", "Cahokia"),
    ("chamois", "Chamois"),
    ("cinq", "Cinq"),
    ("etoile", "Étoile"),
    ("face", "Face"),
    ("fleche", "Flèche"),
    ("flocon", "Flocon"),
    ("lievre-blanc", "Lièvre Blanc"),
    ("marie", "Marie"),
    ("mathilda", "Mathilda"),
    ("ourson", "Ourson"),
    ("papillon", "Papillon"),
    ("piou", "Fusée"),
    ("savoie-53", "Savoie"),
    ("sifflotte", "Sifflotte"),
];
