// House domain model

#[derive(Debug, Clone, PartialEq)]
pub struct House {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub area_m2: u32,
}

impl House {
    pub fn new(id: u64, name: String, address: String, description: &str) -> Self {
        let area_m2 = Self::parse_area(description);
        Self {
            id,
            name,
            address,
            area_m2,
        }
    }

    fn parse_area(description: &str) -> u32 {
        // "Дом 1, квартал 5, 2500 кв. м" -> 2500: first "кв" preceded by digits
        description
            .match_indices("кв")
            .find_map(|(marker, _)| {
                let digits: String = description[..marker]
                    .trim_end()
                    .chars()
                    .rev()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                digits.parse().ok()
            })
            .unwrap_or(0)
    }
}
