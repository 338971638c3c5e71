//! Field vocabulary: which fields each beverage category carries.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const BRAND_NAME: &str = "brand_name";
pub const FANCIFUL_NAME: &str = "fanciful_name";
pub const CLASS_TYPE: &str = "class_type";
pub const ALCOHOL_CONTENT: &str = "alcohol_content";
pub const NET_CONTENTS: &str = "net_contents";
pub const NAME_AND_ADDRESS: &str = "name_and_address";
pub const HEALTH_WARNING: &str = "health_warning";
pub const QUALIFYING_PHRASE: &str = "qualifying_phrase";
pub const COUNTRY_OF_ORIGIN: &str = "country_of_origin";
pub const STATE_OF_DISTILLATION: &str = "state_of_distillation";
pub const AGE_STATEMENT: &str = "age_statement";
pub const SULFITE_DECLARATION: &str = "sulfite_declaration";
pub const GRAPE_VARIETAL: &str = "grape_varietal";
pub const APPELLATION_OF_ORIGIN: &str = "appellation_of_origin";
pub const VINTAGE_YEAR: &str = "vintage_year";

/// Fields derived by elimination rather than by a dedicated extractor.
pub const ELIMINATION_FIELDS: &[&str] = &[BRAND_NAME, FANCIFUL_NAME];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeverageType {
    DistilledSpirits,
    Wine,
    MaltBeverage,
}

impl BeverageType {
    pub const ALL: [BeverageType; 3] = [
        BeverageType::DistilledSpirits,
        BeverageType::Wine,
        BeverageType::MaltBeverage,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSet {
    pub mandatory: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

impl FieldSet {
    fn new(mandatory: &[&str], optional: &[&str]) -> Self {
        Self {
            mandatory: mandatory.iter().map(|it| it.to_string()).collect(),
            optional: optional.iter().map(|it| it.to_string()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.mandatory.iter().chain(&self.optional).map(String::as_str)
    }
}

/// Mandatory and optional field names per beverage category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldVocabulary {
    pub distilled_spirits: FieldSet,
    pub wine: FieldSet,
    pub malt_beverage: FieldSet,
}

impl Default for FieldVocabulary {
    fn default() -> Self {
        Self {
            distilled_spirits: FieldSet::new(
                &[
                    BRAND_NAME,
                    CLASS_TYPE,
                    ALCOHOL_CONTENT,
                    NET_CONTENTS,
                    NAME_AND_ADDRESS,
                    HEALTH_WARNING,
                ],
                &[
                    FANCIFUL_NAME,
                    QUALIFYING_PHRASE,
                    AGE_STATEMENT,
                    COUNTRY_OF_ORIGIN,
                    STATE_OF_DISTILLATION,
                ],
            ),
            wine: FieldSet::new(
                &[
                    BRAND_NAME,
                    CLASS_TYPE,
                    ALCOHOL_CONTENT,
                    NET_CONTENTS,
                    NAME_AND_ADDRESS,
                    HEALTH_WARNING,
                    SULFITE_DECLARATION,
                ],
                &[
                    FANCIFUL_NAME,
                    QUALIFYING_PHRASE,
                    GRAPE_VARIETAL,
                    APPELLATION_OF_ORIGIN,
                    VINTAGE_YEAR,
                    COUNTRY_OF_ORIGIN,
                ],
            ),
            malt_beverage: FieldSet::new(
                &[BRAND_NAME, CLASS_TYPE, NET_CONTENTS, NAME_AND_ADDRESS, HEALTH_WARNING],
                &[FANCIFUL_NAME, QUALIFYING_PHRASE, ALCOHOL_CONTENT, COUNTRY_OF_ORIGIN],
            ),
        }
    }
}

impl FieldVocabulary {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let vocabulary: Self = serde_json::from_str(json)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn fields_for(&self, beverage_type: BeverageType) -> &FieldSet {
        match beverage_type {
            BeverageType::DistilledSpirits => &self.distilled_spirits,
            BeverageType::Wine => &self.wine,
            BeverageType::MaltBeverage => &self.malt_beverage,
        }
    }

    /// Every field of `beverage_type`, or the union over all categories when
    /// the type is unknown. Order is stable: mandatory before optional,
    /// first occurrence wins.
    pub fn fields(&self, beverage_type: Option<BeverageType>) -> Vec<&str> {
        let sets = match beverage_type {
            Some(it) => vec![self.fields_for(it)],
            None => BeverageType::ALL.iter().map(|it| self.fields_for(*it)).collect(),
        };
        let mut fields = Vec::new();
        for name in sets.into_iter().flat_map(FieldSet::iter) {
            if !fields.contains(&name) {
                fields.push(name);
            }
        }
        fields
    }

    pub fn is_mandatory(&self, beverage_type: BeverageType, field_name: &str) -> bool {
        self.fields_for(beverage_type)
            .mandatory
            .iter()
            .any(|it| it == field_name)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for beverage_type in BeverageType::ALL {
            let set = self.fields_for(beverage_type);
            if set.mandatory.is_empty() {
                return Err(Error::InvalidVocabulary(format!(
                    "{beverage_type:?} has no mandatory fields"
                )));
            }
            if let Some(dup) = set.mandatory.iter().find(|it| set.optional.contains(it)) {
                return Err(Error::InvalidVocabulary(format!(
                    "{dup} is both mandatory and optional for {beverage_type:?}"
                )));
            }
        }
        Ok(())
    }
}
