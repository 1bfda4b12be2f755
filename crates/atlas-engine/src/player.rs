use rand::{Rng, seq::IndexedRandom as _};

use crate::{Country, CountryCatalog, session::History};

/// The computer opponent.
///
/// Picks uniformly at random among catalog countries that start with the
/// round's letter and have not been used yet.
#[derive(Debug, Clone, Copy)]
pub struct ComputerPlayer<'a> {
    catalog: &'a CountryCatalog,
}

impl<'a> ComputerPlayer<'a> {
    #[must_use]
    pub fn new(catalog: &'a CountryCatalog) -> Self {
        Self { catalog }
    }

    /// Returns an unused country starting with `letter`, or `None` when every
    /// such country is already in `history`.
    pub fn pick<R>(&self, letter: char, history: &History, rng: &mut R) -> Option<&'a Country>
    where
        R: Rng + ?Sized,
    {
        let eligible = self
            .catalog
            .starting_with(letter)
            .filter(|country| !history.contains(country.canonical()))
            .collect::<Vec<_>>();
        eligible.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::CountryRecord;

    fn catalog() -> CountryCatalog {
        CountryCatalog::from_records(["Benin", "Bhutan", "Brazil", "Chad"].map(|name| {
            CountryRecord {
                name: name.to_owned(),
                aliases: vec![],
            }
        }))
        .unwrap()
    }

    fn history(names: &[&str]) -> History {
        let mut history = History::default();
        for name in names {
            history.insert((*name).to_owned());
        }
        history
    }

    #[test]
    fn test_picks_unused_country_with_letter() {
        let catalog = catalog();
        let player = ComputerPlayer::new(&catalog);
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..20 {
            let pick = player.pick('b', &history(&["brazil"]), &mut rng).unwrap();
            assert!(["benin", "bhutan"].contains(&pick.canonical()));
        }
    }

    #[test]
    fn test_exhausted_letter() {
        let catalog = catalog();
        let player = ComputerPlayer::new(&catalog);
        let mut rng = Pcg32::seed_from_u64(3);
        let used = history(&["benin", "bhutan", "brazil"]);
        assert!(player.pick('b', &used, &mut rng).is_none());
        assert!(player.pick('z', &History::default(), &mut rng).is_none());
    }

    #[test]
    fn test_same_seed_same_pick() {
        let catalog = catalog();
        let player = ComputerPlayer::new(&catalog);
        let picks = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            (0..10)
                .map(|_| player.pick('b', &History::default(), &mut rng).unwrap().canonical())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(11), picks(11));
    }
}
