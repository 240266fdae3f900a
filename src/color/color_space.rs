use std::sync::Arc;

use crate::{
    error::{ParseError, PdfResult},
    function::Function,
    objects::{Object, ObjectType},
    FromObj, Resolve,
};

use super::Rgb;

/// The color spaces a shading may paint in
///
/// CIE-based spaces other than `ICCBased` are not supported. An `ICCBased`
/// space is treated as the device space with the same number of components.
#[derive(Debug, Clone)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,

    /// A single colorant, converted through `tint_transform` into `alternate_space`
    Separation {
        name: String,
        alternate_space: Box<ColorSpace>,
        tint_transform: Arc<Function>,
    },

    /// One component per colorant in `names`
    DeviceN {
        names: Vec<String>,
        alternate_space: Box<ColorSpace>,
        tint_transform: Arc<Function>,
    },
}

impl ColorSpace {
    pub fn name(&self) -> ColorSpaceName {
        match self {
            ColorSpace::DeviceGray => ColorSpaceName::DeviceGray,
            ColorSpace::DeviceRGB => ColorSpaceName::DeviceRGB,
            ColorSpace::DeviceCMYK => ColorSpaceName::DeviceCMYK,
            ColorSpace::Separation { .. } => ColorSpaceName::Separation,
            ColorSpace::DeviceN { .. } => ColorSpaceName::DeviceN,
        }
    }

    pub fn component_count(&self) -> usize {
        match self {
            ColorSpace::DeviceGray | ColorSpace::Separation { .. } => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
            ColorSpace::DeviceN { names, .. } => names.len(),
        }
    }

    /// Convert a color in this space to RGB. Extra components are ignored
    pub fn rgb(&self, components: &[f32]) -> PdfResult<Rgb> {
        let count = self.component_count();

        let Some(components) = components.get(..count) else {
            anyhow::bail!(ParseError::ArityMismatch {
                expected: count,
                found: components.len(),
            });
        };

        Ok(match self {
            ColorSpace::DeviceGray => {
                let gray = components[0];
                Rgb::new(gray, gray, gray)
            }
            ColorSpace::DeviceRGB => Rgb::new(components[0], components[1], components[2]),
            ColorSpace::DeviceCMYK => {
                let [cyan, magenta, yellow, key] = [
                    components[0],
                    components[1],
                    components[2],
                    components[3],
                ];

                Rgb::new(
                    (1.0 - cyan) * (1.0 - key),
                    (1.0 - magenta) * (1.0 - key),
                    (1.0 - yellow) * (1.0 - key),
                )
            }
            ColorSpace::Separation {
                alternate_space,
                tint_transform,
                ..
            }
            | ColorSpace::DeviceN {
                alternate_space,
                tint_transform,
                ..
            } => {
                let mut alternate = vec![0.0; alternate_space.component_count()];
                tint_transform.call(components, &mut alternate)?;

                alternate_space.rgb(&alternate)?
            }
        })
    }

    /// Like [`ColorSpace::rgb`], but colors that fail to convert are black
    pub fn rgb_or_black(&self, components: &[f32]) -> Rgb {
        match self.rgb(components) {
            Ok(rgb) => rgb,
            Err(err) => {
                log::trace!("unable to convert color {:?}: {}", components, err);
                Rgb::BLACK
            }
        }
    }

    fn from_name(name: ColorSpaceName) -> PdfResult<Self> {
        Ok(match name {
            ColorSpaceName::DeviceGray => ColorSpace::DeviceGray,
            ColorSpaceName::DeviceRGB => ColorSpace::DeviceRGB,
            ColorSpaceName::DeviceCMYK => ColorSpace::DeviceCMYK,
            _ => anyhow::bail!(ParseError::UnsupportedColorSpace {
                name: name.as_str(),
            }),
        })
    }

    /// The alternate space of a `Separation` or `DeviceN` space may not itself
    /// be one of those
    fn alternate_from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Box<Self>> {
        let space = ColorSpace::from_obj(obj, resolver)?;

        if matches!(
            space,
            ColorSpace::Separation { .. } | ColorSpace::DeviceN { .. }
        ) {
            anyhow::bail!(ParseError::InvalidColorSpace {
                reason: "alternate space must be a device color space",
            });
        }

        Ok(Box::new(space))
    }

    fn tint_transform_from_obj(
        obj: Object,
        input_count: usize,
        alternate_space: &ColorSpace,
        resolver: &mut dyn Resolve,
    ) -> PdfResult<Arc<Function>> {
        let function = Function::from_obj(obj, resolver)?;

        if function.input_count() != input_count
            || function.output_count() != alternate_space.component_count()
        {
            anyhow::bail!(ParseError::InvalidColorSpace {
                reason: "tint transform does not map the colorants to the alternate space",
            });
        }

        Ok(Arc::new(function))
    }
}

impl FromObj for ColorSpace {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let mut arr = match resolver.resolve(obj)? {
            Object::Name(name) => return Self::from_name(ColorSpaceName::from_str(&name)?),
            Object::Array(arr) => arr.into_iter(),
            found => anyhow::bail!(ParseError::MismatchedObjectTypeAny {
                expected: &[ObjectType::Name, ObjectType::Array],
                found,
            }),
        };

        let mut next = |key: &'static str| arr.next().ok_or(ParseError::MissingRequiredKey { key });

        let family = ColorSpaceName::from_obj(next("ColorSpace")?, resolver)?;

        match family {
            ColorSpaceName::DeviceGray | ColorSpaceName::DeviceRGB | ColorSpaceName::DeviceCMYK => {
                Self::from_name(family)
            }
            ColorSpaceName::ICCBased => {
                let mut stream = resolver.assert_stream(next("ICCBased")?)?;
                let n = stream.dict.other.expect::<u32>("N", resolver)?;

                match n {
                    1 => Ok(ColorSpace::DeviceGray),
                    3 => Ok(ColorSpace::DeviceRGB),
                    4 => Ok(ColorSpace::DeviceCMYK),
                    _ => anyhow::bail!(ParseError::InvalidColorSpace {
                        reason: "ICC profile must have 1, 3 or 4 components",
                    }),
                }
            }
            ColorSpaceName::Separation => {
                let name = resolver.assert_name(next("Name")?)?;
                let alternate_space = Self::alternate_from_obj(next("AlternateSpace")?, resolver)?;
                let tint_transform = Self::tint_transform_from_obj(
                    next("TintTransform")?,
                    1,
                    &alternate_space,
                    resolver,
                )?;

                Ok(ColorSpace::Separation {
                    name,
                    alternate_space,
                    tint_transform,
                })
            }
            ColorSpaceName::DeviceN => {
                let names = <Vec<Object>>::from_obj(next("Names")?, resolver)?
                    .into_iter()
                    .map(|obj| resolver.assert_name(obj))
                    .collect::<PdfResult<Vec<String>>>()?;

                if names.is_empty() {
                    anyhow::bail!(ParseError::InvalidColorSpace {
                        reason: "DeviceN must name at least one colorant",
                    });
                }

                let alternate_space = Self::alternate_from_obj(next("AlternateSpace")?, resolver)?;
                let tint_transform = Self::tint_transform_from_obj(
                    next("TintTransform")?,
                    names.len(),
                    &alternate_space,
                    resolver,
                )?;

                // the optional attributes dictionary only matters for blending

                Ok(ColorSpace::DeviceN {
                    names,
                    alternate_space,
                    tint_transform,
                })
            }
            ColorSpaceName::CalGray
            | ColorSpaceName::CalRGB
            | ColorSpaceName::Lab
            | ColorSpaceName::Indexed
            | ColorSpaceName::Pattern => Self::from_name(family),
        }
    }
}

#[pdf_enum]
pub enum ColorSpaceName {
    DeviceGray = "DeviceGray",
    DeviceRGB = "DeviceRGB",
    DeviceCMYK = "DeviceCMYK",
    CalGray = "CalGray",
    CalRGB = "CalRGB",
    Lab = "Lab",
    ICCBased = "ICCBased",
    Indexed = "Indexed",
    Pattern = "Pattern",
    Separation = "Separation",
    DeviceN = "DeviceN",
}

#[cfg(test)]
mod test {
    use crate::{
        resolve::ObjectStore,
        stream::Stream,
        test_util::{dict, linear_function},
    };

    use super::*;

    fn load(obj: Object) -> PdfResult<ColorSpace> {
        ColorSpace::from_obj(obj, &mut ObjectStore::new())
    }

    fn assert_rgb_close(a: Rgb, b: Rgb) {
        let close = |x: f32, y: f32| (x - y).abs() < 1e-5;

        assert!(
            close(a.red, b.red) && close(a.green, b.green) && close(a.blue, b.blue),
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn device_spaces_by_name() {
        assert_eq!(load(Object::name("DeviceRGB")).unwrap().component_count(), 3);
        assert_eq!(load(Object::name("DeviceCMYK")).unwrap().component_count(), 4);
        assert_eq!(
            load(Object::Array(vec![Object::name("DeviceGray")]))
                .unwrap()
                .component_count(),
            1
        );
    }

    #[test]
    fn cmyk_to_rgb() {
        let rgb = ColorSpace::DeviceCMYK.rgb(&[1.0, 0.0, 0.5, 0.5]).unwrap();

        assert_rgb_close(rgb, Rgb::new(0.0, 0.5, 0.25));
    }

    #[test]
    fn too_few_components() {
        assert!(ColorSpace::DeviceRGB.rgb(&[1.0, 0.0]).is_err());
        assert_eq!(ColorSpace::DeviceRGB.rgb_or_black(&[1.0, 0.0]), Rgb::BLACK);
    }

    #[test]
    fn separation_goes_through_tint_transform() {
        let space = load(Object::Array(vec![
            Object::name("Separation"),
            Object::name("Spot"),
            Object::name("DeviceRGB"),
            linear_function(&[1.0, 1.0, 1.0], &[1.0, 0.0, 0.0]),
        ]))
        .unwrap();

        assert_eq!(space.name(), ColorSpaceName::Separation);
        assert_eq!(space.component_count(), 1);
        assert_rgb_close(space.rgb(&[1.0]).unwrap(), Rgb::new(1.0, 0.0, 0.0));
        assert_rgb_close(space.rgb(&[0.5]).unwrap(), Rgb::new(1.0, 0.5, 0.5));
    }

    #[test]
    fn tint_transform_must_match_alternate_space() {
        let result = load(Object::Array(vec![
            Object::name("Separation"),
            Object::name("Spot"),
            Object::name("DeviceCMYK"),
            linear_function(&[0.0], &[1.0]),
        ]));

        assert!(result.is_err());
    }

    #[test]
    fn device_n_alternate_cannot_be_special() {
        let separation = Object::Array(vec![
            Object::name("Separation"),
            Object::name("Spot"),
            Object::name("DeviceGray"),
            linear_function(&[0.0], &[1.0]),
        ]);

        let result = load(Object::Array(vec![
            Object::name("DeviceN"),
            Object::Array(vec![Object::name("Spot")]),
            separation,
            linear_function(&[0.0], &[1.0]),
        ]));

        assert!(result.is_err());
    }

    #[test]
    fn icc_based_uses_component_count() {
        let stream = Stream::new(dict([("N", Object::Integer(4))]), Vec::new());
        let space = load(Object::Array(vec![
            Object::name("ICCBased"),
            Object::Stream(stream),
        ]))
        .unwrap();

        assert_eq!(space.name(), ColorSpaceName::DeviceCMYK);
    }

    #[test]
    fn lab_is_unsupported() {
        assert!(load(Object::name("Lab")).is_err());
        assert!(load(Object::name("Pattern")).is_err());
    }
}
