//! Built-in dataset: Indian states, agricultural districts, sample mandals/tehsils.

use crate::location::types::{
    AdministrativeGroup as A, LandType as L, RainfallZone as R, SoilGroup as S,
};

pub(super) struct BuiltinRegion {
    pub name: &'static str,
    pub code: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub admin: A,
    pub soil: Option<S>,
    pub rainfall: Option<R>,
    pub land_type: Option<L>,
}

pub(super) struct BuiltinDistrict {
    pub region_code: &'static str,
    pub name: &'static str,
    pub land_type: Option<L>,
    pub localities: &'static [&'static str],
}

macro_rules! region {
    ($name:expr, $code:expr, $lat:expr, $lon:expr, $admin:expr, $soil:expr, $rain:expr, $land:expr) => {
        BuiltinRegion {
            name: $name, code: $code, lat: $lat, lon: $lon,
            admin: $admin, soil: $soil, rainfall: $rain, land_type: $land,
        }
    };
}

macro_rules! district {
    ($code:expr, $name:expr) => {
        BuiltinDistrict { region_code: $code, name: $name, land_type: None, localities: &[] }
    };
    ($code:expr, $name:expr, $land:expr, [$($loc:expr),* $(,)?]) => {
        BuiltinDistrict { region_code: $code, name: $name, land_type: $land, localities: &[$($loc),*] }
    };
    ($code:expr, $name:expr, $land:expr) => {
        BuiltinDistrict { region_code: $code, name: $name, land_type: $land, localities: &[] }
    };
}

pub(super) const REGIONS: &[BuiltinRegion] = &[
    region!("Andhra Pradesh", "AP", 15.9129, 79.7400, A::SouthIndia, Some(S::Red), Some(R::Moderate), None),
    region!("Telangana", "TG", 18.1124, 79.0193, A::SouthIndia, Some(S::Red), Some(R::SemiArid), Some(L::Plateau)),
    region!("Karnataka", "KA", 15.3173, 75.7139, A::SouthIndia, Some(S::Red), Some(R::SemiArid), None),
    region!("Tamil Nadu", "TN", 11.1271, 78.6569, A::SouthIndia, Some(S::Red), Some(R::Moderate), None),
    region!("Kerala", "KL", 10.8505, 76.2711, A::SouthIndia, Some(S::Laterite), Some(R::VeryHigh), Some(L::Coastal)),
    region!("Maharashtra", "MH", 19.7515, 75.7139, A::WestIndia, Some(S::Black), Some(R::SemiArid), None),
    region!("Gujarat", "GJ", 22.2587, 71.1924, A::WestIndia, Some(S::Black), Some(R::SemiArid), None),
    region!("Rajasthan", "RJ", 27.0238, 74.2179, A::WestIndia, Some(S::Desert), Some(R::Arid), Some(L::Rainfed)),
    region!("Goa", "GA", 15.2993, 74.1240, A::WestIndia, Some(S::Laterite), Some(R::VeryHigh), None),
    region!("Madhya Pradesh", "MP", 22.9734, 78.6569, A::CentralIndia, Some(S::Black), Some(R::Moderate), None),
    region!("Chhattisgarh", "CG", 21.2787, 81.8661, A::CentralIndia, Some(S::Red), Some(R::High), None),
    region!("Odisha", "OD", 20.9517, 85.0985, A::EastIndia, Some(S::Red), Some(R::High), None),
    region!("West Bengal", "WB", 22.9868, 87.8550, A::EastIndia, Some(S::Alluvial), Some(R::High), Some(L::Irrigated)),
    region!("Bihar", "BR", 25.0961, 85.3131, A::EastIndia, Some(S::Alluvial), Some(R::Moderate), Some(L::Irrigated)),
    region!("Jharkhand", "JH", 23.6102, 85.2799, A::EastIndia, Some(S::Red), Some(R::High), Some(L::Plateau)),
    region!("Assam", "AS", 26.2006, 92.9376, A::EastIndia, Some(S::Alluvial), Some(R::VeryHigh), None),
    region!("Sikkim", "SK", 27.5330, 88.5122, A::EastIndia, Some(S::Mountain), Some(R::VeryHigh), Some(L::Hill)),
    region!("Uttar Pradesh", "UP", 26.8467, 80.9462, A::NorthIndia, Some(S::Alluvial), Some(R::Moderate), Some(L::Irrigated)),
    region!("Punjab", "PB", 31.1471, 75.3412, A::NorthIndia, Some(S::Alluvial), Some(R::SemiArid), Some(L::Irrigated)),
    region!("Haryana", "HR", 29.0588, 76.0856, A::NorthIndia, Some(S::Alluvial), Some(R::SemiArid), Some(L::Irrigated)),
    region!("Delhi", "DL", 28.7041, 77.1025, A::NorthIndia, None, None, None),
    region!("Uttarakhand", "UK", 30.0668, 79.0193, A::NorthIndia, Some(S::Mountain), Some(R::High), Some(L::Hill)),
    region!("Himachal Pradesh", "HP", 31.1048, 77.1734, A::NorthIndia, Some(S::Mountain), Some(R::Moderate), Some(L::Hill)),
    region!("Jammu and Kashmir", "JK", 33.7782, 76.5762, A::NorthIndia, Some(S::Mountain), Some(R::Moderate), Some(L::Hill)),
];

pub(super) const DISTRICTS: &[BuiltinDistrict] = &[
    // Telangana
    district!("TG", "Adilabad", None, ["Utnoor", "Boath", "Ichoda"]),
    district!("TG", "Nizamabad", Some(L::Irrigated), ["Armoor", "Bodhan", "Banswada"]),
    district!("TG", "Karimnagar", Some(L::Irrigated), ["Huzurabad", "Jammikunta", "Manakondur"]),
    district!("TG", "Medak", None, ["Narsapur", "Ramayampet", "Toopran"]),
    district!("TG", "Warangal", None, ["Narsampet", "Parkal", "Wardhannapet"]),
    district!("TG", "Hyderabad"),
    district!("TG", "Rangareddy", None, ["Chevella", "Shadnagar", "Ibrahimpatnam"]),
    district!("TG", "Khammam", Some(L::Irrigated), ["Sattupalli", "Madhira", "Wyra"]),
    district!("TG", "Nalgonda", Some(L::Rainfed), ["Miryalaguda", "Devarakonda", "Nakrekal"]),
    district!("TG", "Mahabubnagar", Some(L::Rainfed), ["Jadcherla", "Narayanpet", "Kalwakurthy"]),
    // Andhra Pradesh
    district!("AP", "Srikakulam", Some(L::Coastal)),
    district!("AP", "Visakhapatnam", Some(L::Coastal), ["Anakapalli", "Narsipatnam"]),
    district!("AP", "East Godavari", Some(L::Irrigated), ["Rajahmundry Rural", "Amalapuram"]),
    district!("AP", "West Godavari", Some(L::Irrigated), ["Bhimavaram", "Tadepalligudem"]),
    district!("AP", "Krishna", Some(L::Irrigated), ["Gudivada", "Nuzvid"]),
    district!("AP", "Guntur", Some(L::Irrigated), ["Tenali", "Narasaraopet"]),
    district!("AP", "Prakasam", Some(L::Rainfed)),
    district!("AP", "Nellore", Some(L::Coastal)),
    district!("AP", "Kurnool", Some(L::Rainfed), ["Nandyal", "Adoni"]),
    district!("AP", "Anantapur", Some(L::Rainfed), ["Dharmavaram", "Kadiri"]),
    district!("AP", "Kadapa", Some(L::Rainfed)),
    district!("AP", "Chittoor"),
    // Karnataka
    district!("KA", "Belagavi", Some(L::Irrigated), ["Athani", "Gokak"]),
    district!("KA", "Vijayapura", Some(L::Rainfed)),
    district!("KA", "Kalaburagi", Some(L::Rainfed), ["Aland", "Sedam"]),
    district!("KA", "Raichur", Some(L::Irrigated)),
    district!("KA", "Dharwad"),
    district!("KA", "Shivamogga", None, ["Sagar", "Bhadravati"]),
    district!("KA", "Hassan"),
    district!("KA", "Kodagu", Some(L::Hill), ["Madikeri", "Virajpet"]),
    district!("KA", "Mandya", Some(L::Irrigated), ["Maddur", "Malavalli"]),
    district!("KA", "Mysuru", Some(L::Irrigated)),
    // Tamil Nadu
    district!("TN", "Coimbatore", None, ["Pollachi", "Mettupalayam"]),
    district!("TN", "Erode", Some(L::Irrigated)),
    district!("TN", "Salem"),
    district!("TN", "Thanjavur", Some(L::Irrigated), ["Kumbakonam", "Pattukkottai"]),
    district!("TN", "Tiruvarur", Some(L::Irrigated)),
    district!("TN", "Madurai", None, ["Melur", "Usilampatti"]),
    district!("TN", "Tirunelveli", Some(L::Rainfed)),
    // Kerala
    district!("KL", "Kasaragod"),
    district!("KL", "Kannur"),
    district!("KL", "Kozhikode"),
    district!("KL", "Wayanad", Some(L::Hill), ["Sulthan Bathery", "Mananthavady"]),
    district!("KL", "Palakkad", Some(L::Irrigated), ["Chittur", "Alathur"]),
    district!("KL", "Thrissur"),
    district!("KL", "Idukki", Some(L::Hill), ["Munnar", "Thodupuzha"]),
    district!("KL", "Alappuzha", Some(L::Coastal), ["Kuttanad", "Cherthala"]),
    // Maharashtra
    district!("MH", "Nashik", Some(L::Irrigated), ["Niphad", "Sinnar", "Dindori"]),
    district!("MH", "Ahmednagar", Some(L::Rainfed), ["Rahuri", "Sangamner"]),
    district!("MH", "Pune", None, ["Baramati", "Junnar"]),
    district!("MH", "Satara"),
    district!("MH", "Kolhapur", Some(L::Irrigated)),
    district!("MH", "Solapur", Some(L::Rainfed), ["Pandharpur", "Barshi"]),
    district!("MH", "Latur", Some(L::Rainfed)),
    district!("MH", "Amravati", None, ["Achalpur", "Morshi"]),
    district!("MH", "Nagpur", None, ["Katol", "Ramtek"]),
    district!("MH", "Ratnagiri", Some(L::Coastal)),
    // Rajasthan
    district!("RJ", "Jaisalmer", Some(L::Rainfed)),
    district!("RJ", "Barmer", Some(L::Rainfed)),
    district!("RJ", "Bikaner", Some(L::Rainfed)),
    district!("RJ", "Jodhpur", Some(L::Rainfed), ["Phalodi", "Bilara"]),
    district!("RJ", "Sri Ganganagar", Some(L::Irrigated), ["Suratgarh", "Raisinghnagar"]),
    district!("RJ", "Jaipur", None, ["Chomu", "Sanganer"]),
    district!("RJ", "Kota", Some(L::Irrigated)),
    district!("RJ", "Udaipur", Some(L::Hill)),
    // Punjab
    district!("PB", "Amritsar", Some(L::Irrigated), ["Ajnala", "Baba Bakala"]),
    district!("PB", "Jalandhar", Some(L::Irrigated)),
    district!("PB", "Ludhiana", Some(L::Irrigated), ["Khanna", "Samrala", "Jagraon"]),
    district!("PB", "Patiala", Some(L::Irrigated), ["Rajpura", "Nabha"]),
    district!("PB", "Sangrur", Some(L::Irrigated)),
    district!("PB", "Bathinda", Some(L::Irrigated), ["Rampura Phul", "Talwandi Sabo"]),
    // Uttar Pradesh
    district!("UP", "Saharanpur"),
    district!("UP", "Meerut", None, ["Mawana", "Sardhana"]),
    district!("UP", "Agra"),
    district!("UP", "Lucknow", None, ["Malihabad", "Mohanlalganj"]),
    district!("UP", "Kanpur Nagar"),
    district!("UP", "Prayagraj"),
    district!("UP", "Varanasi", None, ["Pindra", "Rajatalab"]),
    district!("UP", "Gorakhpur"),
    // Madhya Pradesh
    district!("MP", "Indore", None, ["Mhow", "Depalpur"]),
    district!("MP", "Bhopal"),
    district!("MP", "Jabalpur"),
    district!("MP", "Hoshangabad", Some(L::Irrigated)),
    district!("MP", "Ujjain"),
    district!("MP", "Sagar", Some(L::Rainfed)),
    // Gujarat
    district!("GJ", "Kutch", Some(L::Rainfed)),
    district!("GJ", "Banaskantha"),
    district!("GJ", "Rajkot", Some(L::Rainfed), ["Gondal", "Jetpur"]),
    district!("GJ", "Junagadh", Some(L::Coastal)),
    district!("GJ", "Anand", Some(L::Irrigated)),
    district!("GJ", "Surat", Some(L::Coastal)),
];
