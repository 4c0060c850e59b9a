//! Static place-name data used by the miner and the validator.
//!
//! Kept as plain tables so the lists can be extended without touching
//! extraction or validation logic.

/// Regional landmarks matched verbatim (case-insensitive) by the nature strategy.
pub const NATURE_LANDMARKS: &[&str] = &[
    "Mission Peak",
    "Mount Diablo",
    "Mount Hamilton",
    "Mount Tamalpais",
    "Twin Peaks",
    "Communications Hill",
    "Sierra Vista",
    "Lick Observatory",
    "Golden Gate Bridge",
    "Golden Gate",
    "Muir Woods",
    "Point Reyes",
    "Big Sur",
    "Yosemite",
    "Castle Rock",
    "Henry Cowell",
    "Almaden Quicksilver",
    "Los Gatos Creek",
    "Coyote Hills",
    "Ed Levin",
    "Joseph Grant",
    "Uvas Canyon",
    "Fremont Peak",
    "Pinnacles",
    "Santa Teresa",
    "Rancho San Antonio",
    "Stevens Creek",
    "Skyline Ridge",
    "Russian Ridge",
    "Windy Hill",
    "Coal Creek",
    "Purisima Creek",
    "Huddart Park",
    "Wunderlich Park",
    "Woodside Store",
    "Foothills Park",
    "Arastradero Preserve",
    "Pearson-Arastradero",
    "Palo Alto Baylands",
    "Shoreline Amphitheatre",
    "Baylands Park",
    "Don Edwards",
    "Coyote Creek",
    "Alviso Marina",
    "Sunol Wilderness",
    "Ohlone Wilderness",
    "Rose Peak",
    "Monument Peak",
    "Flag Hill",
    "Brushy Peak",
    "Mt Umunhum",
    "Belgatos Park",
    "Santa Teresa County Park",
    "Joseph D Grant Park",
    "Fremont Older",
    "Dutch Flat Trail",
    "Grandview",
];

/// Well-known viewpoints accepted by the validator regardless of directory data.
pub const KNOWN_VIEWPOINTS: &[&str] = &[
    "Communications Hill",
    "Mission Peak",
    "Mount Hamilton",
    "Mount Umunhum",
    "Twin Peaks",
    "Coit Tower",
    "Telegraph Hill",
    "Russian Hill",
    "Bernal Heights",
    "Tank Hill",
    "Corona Heights",
    "Mount Diablo",
    "Mount Tamalpais",
    "Lick Observatory",
    "Sierra Vista",
    "Grandview",
    "Castle Rock",
    "Monument Peak",
    "Rose Peak",
    "Flag Hill",
];

/// Leading words that are never part of a place name.
pub const FILLER_PREFIXES: &[&str] = &[
    "the ", "maybe ", "perhaps ", "possibly ", "probably ", "about ", "called ", "near ",
];

/// Capitalized sentence openers that are never the first word of a name.
pub const SENTENCE_LEADERS: &[&str] = &[
    "also", "honestly", "loved", "yesterday", "today", "tonight", "recently", "personally",
    "really", "just", "actually", "seriously", "finally", "hiked", "visited", "tried",
    "climbed", "walked", "enjoyed", "went", "saw", "again", "plus", "especially", "hey",
    "yeah", "yes", "agreed", "seconding", "however", "sadly", "unfortunately", "luckily",
    "overall", "anyway",
];

/// A cleaned name starting with one of these is not a place.
pub const STOPWORD_PREFIXES: &[&str] = &[
    "know ", "the ", "a ", "an ", "you ", "i ", "we ", "they ", "it ", "can ", "could ",
    "might ", "should ", "will ", "would ", "and ", "or ", "but ", "so ", "if ", "when ",
    "where ", "maybe ", "perhaps ", "possibly ", "probably ", "definitely ", "try ",
    "check ", "visit ", "go ", "see ", "find ", "about ",
];

/// Trailing connector words stripped from a captured phrase.
pub const TRAILING_CONNECTORS: &[&str] = &[
    "and", "or", "but", "with", "for", "in", "at", "on", "to", "from",
];

pub const PARKING_TERMS: &[&str] = &[
    "parking",
    "park here",
    "park there",
    "can park",
    "could park",
];
