use rand::Rng;
use rand::seq::SliceRandom;

pub const CPU_NAMES: [&str; 60] = [
    "Amir Ali", "Mohammad", "Ali", "Amir Hossein", "Hossein", "Abolfazl", "Amir Abbas",
    "Mohammad Taha", "Mohammad Hossein", "Kian", "Mohammad Reza", "Mahan", "Arad", "Artin",
    "Samyar", "Yousef", "Reza", "Mahdi", "Ilia", "Taha", "Armin", "Benyamin", "Danial", "Sobhan",
    "Parham", "Arian", "Erfan", "Sadra", "Parsa", "Amir Mahdi", "Fatemeh", "Zahra", "Helma",
    "Zeinab", "Yasna", "Nazanin Zahra", "Ava", "Baran", "Reyhaneh", "Marsana", "Raha", "Hasti",
    "Sana", "Elena", "Sarina", "Asra", "Maryam", "Sofia", "Ailin", "Mohadeseh", "Hananeh",
    "Kowsar", "Negar", "Yekta", "Helia", "Sogand", "Setayesh", "Mahdis", "Aynaz", "Bahar",
];

/// Picks `count` distinct names, capped at the size of the table.
pub fn random_names<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<String> {
    CPU_NAMES
        .choose_multiple(rng, count)
        .map(|name| (*name).to_string())
        .collect()
}
