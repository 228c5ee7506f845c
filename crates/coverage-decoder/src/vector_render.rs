//! Categorized legends for vector products.

use covjson_common::Color;
use covjson_protocol::Parameter;
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::DecoderConfig;
use crate::features::{find_field, Field};

/// Attribute value matched by a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryValue {
    /// Numeric code from `categoryEncoding`.
    Code(f64),
    /// Raw category id.
    Id(String),
}

/// One entry of a categorized legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderCategory {
    /// `None` matches null attributes.
    pub value: Option<CategoryValue>,
    pub color: Option<Color>,
    pub label: String,
}

/// How a vector product should be drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VectorRenderer {
    #[default]
    SingleSymbol,
    Categorized {
        /// Display name of the classified field.
        field: String,
        categories: Vec<RenderCategory>,
    },
}

impl VectorRenderer {
    pub fn is_categorized(&self) -> bool {
        matches!(self, VectorRenderer::Categorized { .. })
    }

    pub fn categories(&self) -> &[RenderCategory] {
        match self {
            VectorRenderer::Categorized { categories, .. } => categories,
            VectorRenderer::SingleSymbol => &[],
        }
    }
}

/// Build a categorized renderer from the first parameter's categories.
///
/// `default` is returned unchanged when there are no parameters, when the
/// first parameter declares no categories, or when no field matches it.
pub fn build_vector_renderer(
    default: VectorRenderer,
    parameters: Option<&IndexMap<String, Parameter>>,
    fields: &[Field],
    config: &DecoderConfig,
) -> VectorRenderer {
    let Some((name, parameter)) = parameters.and_then(|p| p.first()) else {
        return default;
    };
    let Some(declared) = parameter.observed_property.categories.as_ref() else {
        return default;
    };
    let Some(field) = find_field(fields, name) else {
        tracing::debug!(parameter = %name, "No field for categorized parameter");
        return default;
    };

    let mut categories: Vec<RenderCategory> = declared
        .iter()
        .map(|category| {
            let value = parameter
                .category_encoding
                .as_ref()
                .and_then(|encoding| encoding.get(&category.id))
                .map(|code| CategoryValue::Code(*code))
                .unwrap_or_else(|| CategoryValue::Id(category.id.clone()));

            RenderCategory {
                value: Some(value),
                color: category
                    .preferred_color
                    .as_deref()
                    .and_then(|c| Color::parse(c).ok()),
                label: category
                    .label
                    .as_ref()
                    .map(|l| l.first().to_string())
                    .unwrap_or_else(|| category.id.clone()),
            }
        })
        .collect();

    if config.add_no_data_category {
        categories.push(RenderCategory {
            value: None,
            color: Color::parse(&config.no_data_color).ok(),
            label: "No data".to_string(),
        });
    }

    tracing::debug!(
        field = %field.display_name,
        categories = categories.len(),
        "Built categorized renderer"
    );

    VectorRenderer::Categorized {
        field: field.display_name.clone(),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FieldType;
    use covjson_protocol::Category;

    fn fields() -> Vec<Field> {
        vec![Field {
            name: "landuse".into(),
            display_name: "landuse".into(),
            field_type: FieldType::Integer,
        }]
    }

    fn params(parameter: Parameter) -> IndexMap<String, Parameter> {
        let mut map = IndexMap::new();
        map.insert("landuse".to_string(), parameter);
        map
    }

    #[test]
    fn test_categories_remapped_through_encoding() {
        let parameter = Parameter::new("Land use")
            .with_categories(vec![
                Category::new("forest", "Forest").with_color("#228b22"),
                Category::new("water", "Water"),
            ])
            .with_encoding("forest", 1.0)
            .with_encoding("water", 2.0);

        let renderer = build_vector_renderer(
            VectorRenderer::SingleSymbol,
            Some(&params(parameter)),
            &fields(),
            &DecoderConfig::default(),
        );

        let categories = renderer.categories();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].value, Some(CategoryValue::Code(1.0)));
        assert_eq!(categories[0].color, Some(Color::rgb(0x22, 0x8b, 0x22)));
        assert_eq!(categories[0].label, "Forest");
        assert_eq!(categories[1].color, None);
        assert_eq!(categories[2].value, None);
        assert_eq!(categories[2].color, Some(Color::rgb(255, 0, 255)));
    }

    #[test]
    fn test_ids_kept_without_encoding() {
        let parameter =
            Parameter::new("Land use").with_categories(vec![Category::new("urban", "Urban")]);
        let config = DecoderConfig {
            add_no_data_category: false,
            ..Default::default()
        };
        let renderer =
            build_vector_renderer(VectorRenderer::SingleSymbol, Some(&params(parameter)), &fields(), &config);

        assert_eq!(
            renderer.categories(),
            &[RenderCategory {
                value: Some(CategoryValue::Id("urban".into())),
                color: None,
                label: "Urban".into(),
            }]
        );
    }

    #[test]
    fn test_default_kept_without_categories() {
        let parameter = Parameter::new("Land use");
        let renderer = build_vector_renderer(
            VectorRenderer::SingleSymbol,
            Some(&params(parameter)),
            &fields(),
            &DecoderConfig::default(),
        );
        assert_eq!(renderer, VectorRenderer::SingleSymbol);
    }

    #[test]
    fn test_default_kept_without_parameters() {
        let renderer =
            build_vector_renderer(VectorRenderer::SingleSymbol, None, &fields(), &DecoderConfig::default());
        assert!(!renderer.is_categorized());
    }

    #[test]
    fn test_only_first_parameter_is_used() {
        let mut map = IndexMap::new();
        map.insert("depth".to_string(), Parameter::new("Depth"));
        map.insert(
            "landuse".to_string(),
            Parameter::new("Land use").with_categories(vec![Category::new("urban", "Urban")]),
        );
        let renderer =
            build_vector_renderer(VectorRenderer::SingleSymbol, Some(&map), &fields(), &DecoderConfig::default());
        assert_eq!(renderer, VectorRenderer::SingleSymbol);
    }
}
