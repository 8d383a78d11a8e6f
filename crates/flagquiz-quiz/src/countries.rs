//! The built-in country catalog.
//!
//! Each entry carries the lowest difficulty tier that includes it. Tiers
//! are cumulative: a medium game draws from easy and medium countries,
//! an expert game from everything.

use flagquiz_protocol::{Country, CountryCode, Difficulty, Region};

use Difficulty::{Easy, Expert, Hard, Medium};
use Region::{
    Africa, Asia, Caribbean, CentralAmerica, Europe, MiddleEast, NorthAmerica, Oceania,
    SouthAmerica,
};

/// A catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub country: Country,
    /// Lowest tier this country appears in.
    pub tier: Difficulty,
}

impl CatalogEntry {
    /// `true` if a game at `difficulty` may use this country.
    pub fn in_pool(&self, difficulty: Difficulty) -> bool {
        self.tier <= difficulty
    }

    /// The country's region. Built-in entries always have one.
    pub fn region(&self) -> Option<Region> {
        self.country.region
    }
}

/// A set of countries the selector can draw from.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Builds a catalog from arbitrary entries.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|&(code, name, region, tier)| CatalogEntry {
                country: Country {
                    code: CountryCode::from(code),
                    name: name.to_owned(),
                    region: Some(region),
                },
                tier,
            })
            .collect();
        Self { entries }
    }

    /// All entries.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entries usable at `difficulty`.
    pub fn pool(&self, difficulty: Difficulty) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.in_pool(difficulty))
    }

    /// Size of the pool at `difficulty`.
    pub fn pool_size(&self, difficulty: Difficulty) -> usize {
        self.pool(difficulty).count()
    }

    /// Looks up an entry by code.
    pub fn get(&self, code: &CountryCode) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| &e.country.code == code)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[rustfmt::skip]
const BUILTIN: &[(&str, &str, Region, Difficulty)] = &[
    // Easy
    ("us", "United States", NorthAmerica, Easy),
    ("ca", "Canada", NorthAmerica, Easy),
    ("mx", "Mexico", NorthAmerica, Easy),
    ("br", "Brazil", SouthAmerica, Easy),
    ("ar", "Argentina", SouthAmerica, Easy),
    ("gb", "United Kingdom", Europe, Easy),
    ("fr", "France", Europe, Easy),
    ("de", "Germany", Europe, Easy),
    ("it", "Italy", Europe, Easy),
    ("es", "Spain", Europe, Easy),
    ("pt", "Portugal", Europe, Easy),
    ("ie", "Ireland", Europe, Easy),
    ("nl", "Netherlands", Europe, Easy),
    ("be", "Belgium", Europe, Easy),
    ("ch", "Switzerland", Europe, Easy),
    ("se", "Sweden", Europe, Easy),
    ("no", "Norway", Europe, Easy),
    ("dk", "Denmark", Europe, Easy),
    ("fi", "Finland", Europe, Easy),
    ("gr", "Greece", Europe, Easy),
    ("pl", "Poland", Europe, Easy),
    ("ru", "Russia", Europe, Easy),
    ("cn", "China", Asia, Easy),
    ("jp", "Japan", Asia, Easy),
    ("kr", "South Korea", Asia, Easy),
    ("in", "India", Asia, Easy),
    ("au", "Australia", Oceania, Easy),
    ("nz", "New Zealand", Oceania, Easy),
    ("za", "South Africa", Africa, Easy),
    ("eg", "Egypt", Africa, Easy),
    ("tr", "Turkey", MiddleEast, Easy),
    // Medium
    ("at", "Austria", Europe, Medium),
    ("is", "Iceland", Europe, Medium),
    ("ua", "Ukraine", Europe, Medium),
    ("cz", "Czechia", Europe, Medium),
    ("hu", "Hungary", Europe, Medium),
    ("ro", "Romania", Europe, Medium),
    ("bg", "Bulgaria", Europe, Medium),
    ("hr", "Croatia", Europe, Medium),
    ("rs", "Serbia", Europe, Medium),
    ("sk", "Slovakia", Europe, Medium),
    ("co", "Colombia", SouthAmerica, Medium),
    ("cl", "Chile", SouthAmerica, Medium),
    ("pe", "Peru", SouthAmerica, Medium),
    ("ve", "Venezuela", SouthAmerica, Medium),
    ("cu", "Cuba", Caribbean, Medium),
    ("jm", "Jamaica", Caribbean, Medium),
    ("ng", "Nigeria", Africa, Medium),
    ("ke", "Kenya", Africa, Medium),
    ("ma", "Morocco", Africa, Medium),
    ("et", "Ethiopia", Africa, Medium),
    ("gh", "Ghana", Africa, Medium),
    ("sa", "Saudi Arabia", MiddleEast, Medium),
    ("ae", "United Arab Emirates", MiddleEast, Medium),
    ("il", "Israel", MiddleEast, Medium),
    ("ir", "Iran", MiddleEast, Medium),
    ("iq", "Iraq", MiddleEast, Medium),
    ("pk", "Pakistan", Asia, Medium),
    ("th", "Thailand", Asia, Medium),
    ("vn", "Vietnam", Asia, Medium),
    ("id", "Indonesia", Asia, Medium),
    ("ph", "Philippines", Asia, Medium),
    ("my", "Malaysia", Asia, Medium),
    ("sg", "Singapore", Asia, Medium),
    ("np", "Nepal", Asia, Medium),
    // Hard
    ("si", "Slovenia", Europe, Hard),
    ("ba", "Bosnia and Herzegovina", Europe, Hard),
    ("me", "Montenegro", Europe, Hard),
    ("mk", "North Macedonia", Europe, Hard),
    ("al", "Albania", Europe, Hard),
    ("ee", "Estonia", Europe, Hard),
    ("lv", "Latvia", Europe, Hard),
    ("lt", "Lithuania", Europe, Hard),
    ("by", "Belarus", Europe, Hard),
    ("md", "Moldova", Europe, Hard),
    ("lu", "Luxembourg", Europe, Hard),
    ("mc", "Monaco", Europe, Hard),
    ("li", "Liechtenstein", Europe, Hard),
    ("ad", "Andorra", Europe, Hard),
    ("mt", "Malta", Europe, Hard),
    ("cy", "Cyprus", Europe, Hard),
    ("bo", "Bolivia", SouthAmerica, Hard),
    ("py", "Paraguay", SouthAmerica, Hard),
    ("uy", "Uruguay", SouthAmerica, Hard),
    ("ec", "Ecuador", SouthAmerica, Hard),
    ("cr", "Costa Rica", CentralAmerica, Hard),
    ("pa", "Panama", CentralAmerica, Hard),
    ("ni", "Nicaragua", CentralAmerica, Hard),
    ("hn", "Honduras", CentralAmerica, Hard),
    ("sv", "El Salvador", CentralAmerica, Hard),
    ("gt", "Guatemala", CentralAmerica, Hard),
    ("do", "Dominican Republic", Caribbean, Hard),
    ("ht", "Haiti", Caribbean, Hard),
    ("tt", "Trinidad and Tobago", Caribbean, Hard),
    ("dz", "Algeria", Africa, Hard),
    ("tn", "Tunisia", Africa, Hard),
    ("ly", "Libya", Africa, Hard),
    ("sd", "Sudan", Africa, Hard),
    ("sn", "Senegal", Africa, Hard),
    ("ml", "Mali", Africa, Hard),
    ("ci", "Ivory Coast", Africa, Hard),
    ("cm", "Cameroon", Africa, Hard),
    ("td", "Chad", Africa, Hard),
    ("tz", "Tanzania", Africa, Hard),
    ("ug", "Uganda", Africa, Hard),
    ("rw", "Rwanda", Africa, Hard),
    ("zw", "Zimbabwe", Africa, Hard),
    ("zm", "Zambia", Africa, Hard),
    ("ao", "Angola", Africa, Hard),
    ("mz", "Mozambique", Africa, Hard),
    ("mg", "Madagascar", Africa, Hard),
    ("jo", "Jordan", MiddleEast, Hard),
    ("sy", "Syria", MiddleEast, Hard),
    ("lb", "Lebanon", MiddleEast, Hard),
    ("kw", "Kuwait", MiddleEast, Hard),
    ("qa", "Qatar", MiddleEast, Hard),
    ("bh", "Bahrain", MiddleEast, Hard),
    ("om", "Oman", MiddleEast, Hard),
    ("ye", "Yemen", MiddleEast, Hard),
    ("af", "Afghanistan", Asia, Hard),
    ("bd", "Bangladesh", Asia, Hard),
    ("lk", "Sri Lanka", Asia, Hard),
    ("mm", "Myanmar", Asia, Hard),
    ("kh", "Cambodia", Asia, Hard),
    ("la", "Laos", Asia, Hard),
    ("mn", "Mongolia", Asia, Hard),
    ("kz", "Kazakhstan", Asia, Hard),
    ("uz", "Uzbekistan", Asia, Hard),
    ("bt", "Bhutan", Asia, Hard),
    // Expert
    ("bf", "Burkina Faso", Africa, Expert),
    ("bj", "Benin", Africa, Expert),
    ("tg", "Togo", Africa, Expert),
    ("ne", "Niger", Africa, Expert),
    ("gn", "Guinea", Africa, Expert),
    ("gw", "Guinea-Bissau", Africa, Expert),
    ("gq", "Equatorial Guinea", Africa, Expert),
    ("ga", "Gabon", Africa, Expert),
    ("cg", "Republic of the Congo", Africa, Expert),
    ("cd", "DR Congo", Africa, Expert),
    ("cf", "Central African Republic", Africa, Expert),
    ("ss", "South Sudan", Africa, Expert),
    ("er", "Eritrea", Africa, Expert),
    ("dj", "Djibouti", Africa, Expert),
    ("so", "Somalia", Africa, Expert),
    ("bi", "Burundi", Africa, Expert),
    ("mw", "Malawi", Africa, Expert),
    ("ls", "Lesotho", Africa, Expert),
    ("sz", "Eswatini", Africa, Expert),
    ("bw", "Botswana", Africa, Expert),
    ("na", "Namibia", Africa, Expert),
    ("mr", "Mauritania", Africa, Expert),
    ("gm", "Gambia", Africa, Expert),
    ("sl", "Sierra Leone", Africa, Expert),
    ("lr", "Liberia", Africa, Expert),
    ("cv", "Cape Verde", Africa, Expert),
    ("km", "Comoros", Africa, Expert),
    ("sc", "Seychelles", Africa, Expert),
    ("mu", "Mauritius", Africa, Expert),
    ("tm", "Turkmenistan", Asia, Expert),
    ("kg", "Kyrgyzstan", Asia, Expert),
    ("tj", "Tajikistan", Asia, Expert),
    ("az", "Azerbaijan", Asia, Expert),
    ("am", "Armenia", Asia, Expert),
    ("ge", "Georgia", Asia, Expert),
    ("bn", "Brunei", Asia, Expert),
    ("tl", "Timor-Leste", Asia, Expert),
    ("mv", "Maldives", Asia, Expert),
    ("pg", "Papua New Guinea", Oceania, Expert),
    ("fj", "Fiji", Oceania, Expert),
    ("ws", "Samoa", Oceania, Expert),
    ("to", "Tonga", Oceania, Expert),
    ("vu", "Vanuatu", Oceania, Expert),
    ("sb", "Solomon Islands", Oceania, Expert),
    ("ki", "Kiribati", Oceania, Expert),
    ("tv", "Tuvalu", Oceania, Expert),
    ("nr", "Nauru", Oceania, Expert),
    ("pw", "Palau", Oceania, Expert),
    ("mh", "Marshall Islands", Oceania, Expert),
    ("fm", "Micronesia", Oceania, Expert),
    ("bs", "Bahamas", Caribbean, Expert),
    ("bb", "Barbados", Caribbean, Expert),
    ("lc", "Saint Lucia", Caribbean, Expert),
    ("vc", "Saint Vincent and the Grenadines", Caribbean, Expert),
    ("gd", "Grenada", Caribbean, Expert),
    ("dm", "Dominica", Caribbean, Expert),
    ("ag", "Antigua and Barbuda", Caribbean, Expert),
    ("kn", "Saint Kitts and Nevis", Caribbean, Expert),
    ("bz", "Belize", CentralAmerica, Expert),
    ("gy", "Guyana", SouthAmerica, Expert),
    ("sr", "Suriname", SouthAmerica, Expert),
    ("va", "Vatican City", Europe, Expert),
    ("sm", "San Marino", Europe, Expert),
];
