use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
pub struct Valute {
    #[serde(rename = "CharCode")]
    pub char_code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "VunitRate")]
    pub vunit_rate: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ValCurs {
    #[serde(rename = "@Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Valute", default)]
    pub valute: Vec<Valute>,
}
