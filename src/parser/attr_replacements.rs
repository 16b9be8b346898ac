//! Attribute and tag-name adjustments for foreign (MathML/SVG) content.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::tokenizer::token::Attribute;

lazy_static! {
    /// Adjustments for attribute names on MathML elements
    pub(crate) static ref MATHML_ADJUSTMENTS: HashMap<&'static str, &'static str> =
        [("definitionurl", "definitionURL")].into_iter().collect();

    /// Adjustments for attribute names on SVG elements
    pub(crate) static ref SVG_ADJUSTMENTS_ATTRIBUTES: HashMap<&'static str, &'static str> = [
        ("attributename", "attributeName"),
        ("attributetype", "attributeType"),
        ("basefrequency", "baseFrequency"),
        ("baseprofile", "baseProfile"),
        ("calcmode", "calcMode"),
        ("clippathunits", "clipPathUnits"),
        ("contentscripttype", "contentScriptType"),
        ("contentstyletype", "contentStyleType"),
        ("diffuseconstant", "diffuseConstant"),
        ("edgemode", "edgeMode"),
        ("externalresourcesrequired", "externalResourcesRequired"),
        ("filterres", "filterRes"),
        ("filterunits", "filterUnits"),
        ("glyphref", "glyphRef"),
        ("gradienttransform", "gradientTransform"),
        ("gradientunits", "gradientUnits"),
        ("kernelmatrix", "kernelMatrix"),
        ("kernelunitlength", "kernelUnitLength"),
        ("keypoints", "keyPoints"),
        ("keysplines", "keySplines"),
        ("keytimes", "keyTimes"),
        ("lengthadjust", "lengthAdjust"),
        ("limitingconeangle", "limitingConeAngle"),
        ("markerheight", "markerHeight"),
        ("markerunits", "markerUnits"),
        ("markerwidth", "markerWidth"),
        ("maskcontentunits", "maskContentUnits"),
        ("maskunits", "maskUnits"),
        ("numoctaves", "numOctaves"),
        ("pathlength", "pathLength"),
        ("patterncontentunits", "patternContentUnits"),
        ("patterntransform", "patternTransform"),
        ("patternunits", "patternUnits"),
        ("pointsatx", "pointsAtX"),
        ("pointsaty", "pointsAtY"),
        ("pointsatz", "pointsAtZ"),
        ("preservealpha", "preserveAlpha"),
        ("preserveaspectratio", "preserveAspectRatio"),
        ("primitiveunits", "primitiveUnits"),
        ("refx", "refX"),
        ("refy", "refY"),
        ("repeatcount", "repeatCount"),
        ("repeatdur", "repeatDur"),
        ("requiredextensions", "requiredExtensions"),
        ("requiredfeatures", "requiredFeatures"),
        ("specularconstant", "specularConstant"),
        ("specularexponent", "specularExponent"),
        ("spreadmethod", "spreadMethod"),
        ("startoffset", "startOffset"),
        ("stddeviation", "stdDeviation"),
        ("stitchtiles", "stitchTiles"),
        ("surfacescale", "surfaceScale"),
        ("systemlanguage", "systemLanguage"),
        ("tablevalues", "tableValues"),
        ("targetx", "targetX"),
        ("targety", "targetY"),
        ("textlength", "textLength"),
        ("viewbox", "viewBox"),
        ("viewtarget", "viewTarget"),
        ("xchannelselector", "xChannelSelector"),
        ("ychannelselector", "yChannelSelector"),
        ("zoomandpan", "zoomAndPan"),
    ]
    .into_iter()
    .collect();

    /// The tokenizer lowercases tag names, but SVG wants the camelCase forms
    /// (e.g. "foreignObject") back.
    pub(crate) static ref SVG_ADJUSTMENTS_TAGS: HashMap<&'static str, &'static str> = [
        ("altglyph", "altGlyph"),
        ("altglyphdef", "altGlyphDef"),
        ("altglyphitem", "altGlyphItem"),
        ("animatecolor", "animateColor"),
        ("animatemotion", "animateMotion"),
        ("animatetransform", "animateTransform"),
        ("clippath", "clipPath"),
        ("feblend", "feBlend"),
        ("fecolormatrix", "feColorMatrix"),
        ("fecomponenttransfer", "feComponentTransfer"),
        ("fecomposite", "feComposite"),
        ("feconvolvematrix", "feConvolveMatrix"),
        ("fediffuselighting", "feDiffuseLighting"),
        ("fedisplacementmap", "feDisplacementMap"),
        ("fedistantlight", "feDistantLight"),
        ("feflood", "feFlood"),
        ("fefunca", "feFuncA"),
        ("fefuncb", "feFuncB"),
        ("fefuncg", "feFuncG"),
        ("fefuncr", "feFuncR"),
        ("fegaussianblur", "feGaussianBlur"),
        ("feimage", "feImage"),
        ("femerge", "feMerge"),
        ("femergenode", "feMergeNode"),
        ("femorphology", "feMorphology"),
        ("feoffset", "feOffset"),
        ("fepointlight", "fePointLight"),
        ("fespecularlighting", "feSpecularLighting"),
        ("fespotlight", "feSpotLight"),
        ("fetile", "feTile"),
        ("feturbulence", "feTurbulence"),
        ("foreignobject", "foreignObject"),
        ("glyphref", "glyphRef"),
        ("lineargradient", "linearGradient"),
        ("radialgradient", "radialGradient"),
        ("textpath", "textPath"),
    ]
    .into_iter()
    .collect();
}

/// Rewrites attribute names through the given adjustment map.
pub(crate) fn adjust_attribute_names(
    attrs: &mut [Attribute],
    adjustments: &HashMap<&'static str, &'static str>,
) {
    for attr in attrs {
        if let Some(&adjusted) = adjustments.get(attr.name.as_str()) {
            attr.name = adjusted.to_string();
        }
    }
}

/// Moves the xlink:/xml:/xmlns: prefixes of foreign attributes into the
/// attribute namespace.
pub(crate) fn adjust_foreign_attributes(attrs: &mut [Attribute]) {
    for attr in attrs {
        if !attr.name.starts_with('x') {
            continue;
        }
        match attr.name.as_str() {
            "xlink:actuate" | "xlink:arcrole" | "xlink:href" | "xlink:role" | "xlink:show"
            | "xlink:title" | "xlink:type" | "xml:base" | "xml:lang" | "xml:space"
            | "xmlns:xlink" => {
                let colon = attr.name.find(':').expect("prefixed name");
                let (namespace, name) = attr.name.split_at(colon);
                attr.namespace = namespace.to_string();
                attr.name = name[1..].to_string();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_attribute_adjustment() {
        let mut attrs = vec![
            Attribute::new("viewbox", "0 0 1 1"),
            Attribute::new("fill", "red"),
        ];
        adjust_attribute_names(&mut attrs, &SVG_ADJUSTMENTS_ATTRIBUTES);
        assert_eq!(attrs[0].name, "viewBox");
        assert_eq!(attrs[1].name, "fill");
    }

    #[test]
    fn mathml_attribute_adjustment() {
        let mut attrs = vec![Attribute::new("definitionurl", "x")];
        adjust_attribute_names(&mut attrs, &MATHML_ADJUSTMENTS);
        assert_eq!(attrs[0].name, "definitionURL");
    }

    #[test]
    fn foreign_attribute_namespaces() {
        let mut attrs = vec![
            Attribute::new("xlink:href", "#a"),
            Attribute::new("xml:lang", "en"),
            Attribute::new("xmlns", "b"),
            Attribute::new("xmlnope:x", "c"),
        ];
        adjust_foreign_attributes(&mut attrs);
        assert_eq!((attrs[0].namespace.as_str(), attrs[0].name.as_str()), ("xlink", "href"));
        assert_eq!((attrs[1].namespace.as_str(), attrs[1].name.as_str()), ("xml", "lang"));
        // A plain "xmlns" and unknown prefixes stay as-is.
        assert_eq!((attrs[2].namespace.as_str(), attrs[2].name.as_str()), ("", "xmlns"));
        assert_eq!((attrs[3].namespace.as_str(), attrs[3].name.as_str()), ("", "xmlnope:x"));
    }
}
