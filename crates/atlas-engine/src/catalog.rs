use std::collections::{BTreeMap, HashMap};

use atlas_text::normalize;
use serde::{Deserialize, Serialize};

/// Built-in country list: display name and alternative names.
const BUILTIN_COUNTRIES: &[(&str, &[&str])] = &[
    ("Afghanistan", &[]),
    ("Albania", &[]),
    ("Algeria", &[]),
    ("Andorra", &[]),
    ("Angola", &[]),
    ("Antigua and Barbuda", &["antigua"]),
    ("Argentina", &[]),
    ("Armenia", &[]),
    ("Australia", &[]),
    ("Austria", &[]),
    ("Azerbaijan", &[]),
    ("Bahamas", &[]),
    ("Bahrain", &[]),
    ("Bangladesh", &[]),
    ("Barbados", &[]),
    ("Belarus", &[]),
    ("Belgium", &[]),
    ("Belize", &[]),
    ("Benin", &[]),
    ("Bhutan", &[]),
    ("Bolivia", &[]),
    ("Bosnia and Herzegovina", &["bosnia"]),
    ("Botswana", &[]),
    ("Brazil", &[]),
    ("Brunei", &["brunei darussalam"]),
    ("Bulgaria", &[]),
    ("Burkina Faso", &[]),
    ("Burundi", &[]),
    ("Cabo Verde", &["cape verde"]),
    ("Cambodia", &[]),
    ("Cameroon", &[]),
    ("Canada", &[]),
    ("Central African Republic", &[]),
    ("Chad", &[]),
    ("Chile", &[]),
    ("China", &[]),
    ("Colombia", &[]),
    ("Comoros", &[]),
    ("Congo", &["congo brazzaville"]),
    ("Costa Rica", &[]),
    ("Côte d'Ivoire", &["cote d ivoire", "ivory coast"]),
    ("Croatia", &[]),
    ("Cuba", &[]),
    ("Cyprus", &[]),
    ("Czech Republic", &["czechia"]),
    ("Democratic Republic of the Congo", &["dr congo", "drc", "congo kinshasa"]),
    ("Denmark", &[]),
    ("Djibouti", &[]),
    ("Dominica", &[]),
    ("Dominican Republic", &[]),
    ("Ecuador", &[]),
    ("Egypt", &[]),
    ("El Salvador", &[]),
    ("Equatorial Guinea", &[]),
    ("Eritrea", &[]),
    ("Estonia", &[]),
    ("Eswatini", &["swaziland"]),
    ("Ethiopia", &[]),
    ("Fiji", &[]),
    ("Finland", &[]),
    ("France", &[]),
    ("Gabon", &[]),
    ("Gambia", &[]),
    ("Georgia", &[]),
    ("Germany", &[]),
    ("Ghana", &[]),
    ("Greece", &[]),
    ("Grenada", &[]),
    ("Guatemala", &[]),
    ("Guinea", &[]),
    ("Guinea-Bissau", &[]),
    ("Guyana", &[]),
    ("Haiti", &[]),
    ("Honduras", &[]),
    ("Hungary", &[]),
    ("Iceland", &[]),
    ("India", &[]),
    ("Indonesia", &[]),
    ("Iran", &[]),
    ("Iraq", &[]),
    ("Ireland", &[]),
    ("Israel", &[]),
    ("Italy", &[]),
    ("Jamaica", &[]),
    ("Japan", &[]),
    ("Jordan", &[]),
    ("Kazakhstan", &[]),
    ("Kenya", &[]),
    ("Kiribati", &[]),
    ("Kuwait", &[]),
    ("Kyrgyzstan", &[]),
    ("Laos", &["lao"]),
    ("Latvia", &[]),
    ("Lebanon", &[]),
    ("Lesotho", &[]),
    ("Liberia", &[]),
    ("Libya", &[]),
    ("Liechtenstein", &[]),
    ("Lithuania", &[]),
    ("Luxembourg", &[]),
    ("Madagascar", &[]),
    ("Malawi", &[]),
    ("Malaysia", &[]),
    ("Maldives", &[]),
    ("Mali", &[]),
    ("Malta", &[]),
    ("Marshall Islands", &[]),
    ("Mauritania", &[]),
    ("Mauritius", &[]),
    ("Mexico", &[]),
    ("Micronesia", &["federated states of micronesia"]),
    ("Moldova", &[]),
    ("Monaco", &[]),
    ("Mongolia", &[]),
    ("Montenegro", &[]),
    ("Morocco", &[]),
    ("Mozambique", &[]),
    ("Myanmar", &["burma"]),
    ("Namibia", &[]),
    ("Nauru", &[]),
    ("Nepal", &[]),
    ("Netherlands", &["holland"]),
    ("New Zealand", &[]),
    ("Nicaragua", &[]),
    ("Niger", &[]),
    ("Nigeria", &[]),
    ("North Korea", &["dprk"]),
    ("North Macedonia", &["macedonia"]),
    ("Norway", &[]),
    ("Oman", &[]),
    ("Pakistan", &[]),
    ("Palau", &[]),
    ("Palestine", &[]),
    ("Panama", &[]),
    ("Papua New Guinea", &[]),
    ("Paraguay", &[]),
    ("Peru", &[]),
    ("Philippines", &[]),
    ("Poland", &[]),
    ("Portugal", &[]),
    ("Qatar", &[]),
    ("Romania", &[]),
    ("Russia", &["russian federation"]),
    ("Rwanda", &[]),
    ("Saint Kitts and Nevis", &[]),
    ("Saint Lucia", &[]),
    ("Saint Vincent and the Grenadines", &[]),
    ("Samoa", &[]),
    ("San Marino", &[]),
    ("Sao Tome and Principe", &["são tomé and príncipe"]),
    ("Saudi Arabia", &[]),
    ("Senegal", &[]),
    ("Serbia", &[]),
    ("Seychelles", &[]),
    ("Sierra Leone", &[]),
    ("Singapore", &[]),
    ("Slovakia", &[]),
    ("Slovenia", &[]),
    ("Solomon Islands", &[]),
    ("Somalia", &[]),
    ("South Africa", &[]),
    ("South Korea", &["korea"]),
    ("South Sudan", &[]),
    ("Spain", &[]),
    ("Sri Lanka", &[]),
    ("Sudan", &[]),
    ("Suriname", &[]),
    ("Sweden", &[]),
    ("Switzerland", &[]),
    ("Syria", &[]),
    ("Taiwan", &[]),
    ("Tajikistan", &[]),
    ("Tanzania", &[]),
    ("Thailand", &[]),
    ("Timor-Leste", &["east timor"]),
    ("Togo", &[]),
    ("Tonga", &[]),
    ("Trinidad and Tobago", &["trinidad"]),
    ("Tunisia", &[]),
    ("Turkey", &["türkiye", "turkiye"]),
    ("Turkmenistan", &[]),
    ("Tuvalu", &[]),
    ("Uganda", &[]),
    ("Ukraine", &[]),
    ("United Arab Emirates", &["uae"]),
    ("United Kingdom", &["uk", "great britain", "britain"]),
    ("United States", &["usa", "us", "america"]),
    ("Uruguay", &[]),
    ("Uzbekistan", &[]),
    ("Vanuatu", &[]),
    ("Vatican City", &["vatican", "holy see"]),
    ("Venezuela", &[]),
    ("Vietnam", &["viet nam"]),
    ("Yemen", &[]),
    ("Zambia", &[]),
    ("Zimbabwe", &[]),
];

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CatalogError {
    #[display("country catalog is empty")]
    Empty,
    #[display("country name {name:?} is empty after normalization")]
    EmptyName { name: String },
    #[display("{name:?} collides with another country or alias as {canonical:?}")]
    DuplicateName { name: String, canonical: String },
}

/// One entry of a country list file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Reference data for one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    name: String,
    canonical: String,
    letter: char,
    aliases: Vec<String>,
}

impl Country {
    /// Name for display, as written in the catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical form used for comparison and history.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    #[must_use]
    pub fn letter(&self) -> char {
        self.letter
    }

    /// Canonical forms of the alternative names.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// Immutable list of known countries, indexed by canonical form and letter.
///
/// Aliases resolve to their country, so `"usa"`, `"america"` and
/// `"united states"` all look up the same entry.
#[derive(Debug, Clone)]
pub struct CountryCatalog {
    countries: Vec<Country>,
    by_canonical: HashMap<String, usize>,
    by_letter: BTreeMap<char, Vec<usize>>,
}

impl CountryCatalog {
    /// The built-in list of 196 countries.
    #[must_use]
    pub fn builtin() -> Self {
        let records = BUILTIN_COUNTRIES.iter().map(|(name, aliases)| CountryRecord {
            name: (*name).to_owned(),
            aliases: aliases.iter().map(|a| (*a).to_owned()).collect(),
        });
        Self::from_records(records).expect("built-in country list should be valid")
    }

    /// Builds a catalog, normalizing every name and alias.
    ///
    /// An alias that normalizes to its own country's name is ignored. Any other
    /// collision between names or aliases is an error.
    pub fn from_records<I>(records: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = CountryRecord>,
    {
        let mut countries = Vec::new();
        let mut by_canonical = HashMap::new();
        let mut by_letter = BTreeMap::<char, Vec<usize>>::new();

        for CountryRecord { name, aliases } in records {
            let index = countries.len();
            let canonical = canonical_name(&name)?;
            claim(&mut by_canonical, &name, &canonical, index)?;

            let mut alias_forms = Vec::with_capacity(aliases.len());
            for alias in &aliases {
                let alias_form = canonical_name(alias)?;
                if alias_form == canonical || alias_forms.contains(&alias_form) {
                    continue;
                }
                claim(&mut by_canonical, alias, &alias_form, index)?;
                alias_forms.push(alias_form);
            }

            let letter = first_letter(&canonical);
            by_letter.entry(letter).or_default().push(index);
            countries.push(Country {
                name,
                canonical,
                letter,
                aliases: alias_forms,
            });
        }

        if countries.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self {
            countries,
            by_canonical,
            by_letter,
        })
    }

    #[must_use]
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Looks up a country by canonical name or canonical alias.
    #[must_use]
    pub fn get(&self, canonical: &str) -> Option<&Country> {
        self.by_canonical
            .get(canonical)
            .map(|&index| &self.countries[index])
    }

    /// Countries whose canonical form starts with `letter`, in catalog order.
    pub fn starting_with(&self, letter: char) -> impl Iterator<Item = &Country> + '_ {
        self.by_letter
            .get(&letter)
            .into_iter()
            .flatten()
            .map(|&index| &self.countries[index])
    }

    /// Letters that start at least `min` countries, in alphabetical order.
    #[must_use]
    pub fn letters_with_at_least(&self, min: usize) -> Vec<char> {
        self.by_letter
            .iter()
            .filter(|(_, indices)| indices.len() >= min.max(1))
            .map(|(&letter, _)| letter)
            .collect()
    }

    /// Every name and alias as raw text, for training the classifier.
    pub fn all_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.countries.iter().flat_map(|country| {
            std::iter::once(country.canonical())
                .chain(country.aliases().iter().map(String::as_str))
        })
    }
}

fn canonical_name(name: &str) -> Result<String, CatalogError> {
    normalize(name).map_err(|_| CatalogError::EmptyName {
        name: name.to_owned(),
    })
}

fn claim(
    by_canonical: &mut HashMap<String, usize>,
    name: &str,
    canonical: &str,
    index: usize,
) -> Result<(), CatalogError> {
    if by_canonical.contains_key(canonical) {
        return Err(CatalogError::DuplicateName {
            name: name.to_owned(),
            canonical: canonical.to_owned(),
        });
    }
    by_canonical.insert(canonical.to_owned(), index);
    Ok(())
}

/// First character of a canonical form.
///
/// Canonical forms are never empty, so this always finds a letter.
pub(crate) fn first_letter(canonical: &str) -> char {
    canonical.chars().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, aliases: &[&str]) -> CountryRecord {
        CountryRecord {
            name: name.to_owned(),
            aliases: aliases.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = CountryCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_COUNTRIES.len());
        assert_eq!(catalog.get("brazil").unwrap().name(), "Brazil");
        assert_eq!(catalog.get("guinea bissau").unwrap().name(), "Guinea-Bissau");
        assert_eq!(catalog.get("usa").unwrap().canonical(), "united states");
        assert_eq!(catalog.get("america").unwrap().canonical(), "united states");
        assert!(catalog.get("atlantis").is_none());
    }

    #[test]
    fn test_builtin_names_are_canonical_and_lettered() {
        let catalog = CountryCatalog::builtin();
        for country in catalog.countries() {
            assert_eq!(normalize(country.canonical()).unwrap(), country.canonical());
            assert!(country.canonical().starts_with(country.letter()));
            assert!(country.letter().is_lowercase(), "{country:?}");
        }
    }

    #[test]
    fn test_letter_index() {
        let catalog = CountryCatalog::builtin();
        let b = catalog.starting_with('b').map(Country::canonical).collect::<Vec<_>>();
        assert!(b.contains(&"brazil"));
        assert!(b.iter().all(|name| name.starts_with('b')));
        assert_eq!(catalog.starting_with('x').count(), 0);

        let letters = catalog.letters_with_at_least(3);
        assert!(letters.contains(&'b'));
        assert!(!letters.contains(&'q'), "only Qatar starts with Q");
        assert!(!letters.contains(&'x'));
        assert!(letters.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_all_names_include_aliases() {
        let catalog = CountryCatalog::from_records([
            record("Myanmar", &["Burma"]),
            record("Chad", &[]),
        ])
        .unwrap();
        let names = catalog.all_names().collect::<Vec<_>>();
        assert_eq!(names, ["myanmar", "burma", "chad"]);
    }

    #[test]
    fn test_self_alias_is_ignored() {
        let catalog = CountryCatalog::from_records([record("The Gambia", &["Gambia"])]).unwrap();
        let gambia = catalog.get("gambia").unwrap();
        assert!(gambia.aliases().is_empty());
    }

    #[test]
    fn test_invalid_records() {
        assert_eq!(
            CountryCatalog::from_records([]).unwrap_err(),
            CatalogError::Empty
        );
        assert!(matches!(
            CountryCatalog::from_records([record("123", &[])]).unwrap_err(),
            CatalogError::EmptyName { .. }
        ));
        assert!(matches!(
            CountryCatalog::from_records([record("Chad", &[]), record("CHAD!", &[])]).unwrap_err(),
            CatalogError::DuplicateName { .. }
        ));
        assert!(matches!(
            CountryCatalog::from_records([record("Chad", &[]), record("Niger", &["chad"])])
                .unwrap_err(),
            CatalogError::DuplicateName { .. }
        ));
    }

    #[test]
    fn test_records_deserialize_without_aliases() {
        let records: Vec<CountryRecord> =
            serde_json::from_str(r#"[{"name": "Chad"}, {"name": "Niger", "aliases": ["Nigé"]}]"#)
                .unwrap();
        assert_eq!(records[0], record("Chad", &[]));
        assert_eq!(records[1].aliases, ["Nigé"]);
    }
}
