//! Spring Web MVC endpoint reading
//!
//! Every selected class meta-annotated with `@RestController` becomes an
//! endpoint group, and every public instance method with a (meta)
//! `@RequestMapping` anywhere in its hierarchy becomes an endpoint of it.

use tracing::{debug, info, instrument, warn};

use crate::analysis::annotations::AnnotationResolver;
use crate::analysis::settings::TranslationSettings;
use crate::analysis::translator::TypeTranslator;
use crate::analysis::uri::parse_spring_uri_template;
use crate::api::{ApiDefinition, ApiType, Endpoint, EndpointGroup, EndpointParameter, HttpMethod, UriTemplate};
use crate::core::types::{JavaType, TypeEnvironment};
use crate::errors::{Result, TranslationError};
use crate::model::annotation::AnnotatedElement;
use crate::model::class::{JavaClass, JavaMethod, JavaParameter};
use crate::model::loader::{BoundClass, JavaModel};

pub const REST_CONTROLLER: &str = "org.springframework.web.bind.annotation.RestController";
pub const REQUEST_MAPPING: &str = "org.springframework.web.bind.annotation.RequestMapping";
pub const REQUEST_BODY: &str = "org.springframework.web.bind.annotation.RequestBody";
pub const REQUEST_PARAM: &str = "org.springframework.web.bind.annotation.RequestParam";
pub const PATH_VARIABLE: &str = "org.springframework.web.bind.annotation.PathVariable";
pub const HTTP_ENTITY: &str = "org.springframework.http.HttpEntity";
pub const RESPONSE_ENTITY: &str = "org.springframework.http.ResponseEntity";
pub const CALLABLE: &str = "java.util.concurrent.Callable";

/// Reads the endpoints of `model` and every type they reach into a new API definition.
#[instrument(skip(model, settings), fields(classes = model.class_count()))]
pub fn read_api_definition(model: &JavaModel, settings: &TranslationSettings) -> Result<ApiDefinition> {
    let mut reader = EndpointReader::new(model, settings);
    reader.create_endpoints_for_controllers()?;
    reader.translate_roots()?;

    let mut api = reader.translator.into_api();
    for (module, types) in settings.imports() {
        api.add_import(module, types)?;
    }

    info!(
        endpoint_groups = api.endpoint_group_count(),
        endpoints = api.endpoint_count(),
        classes = api.class_definition_count(),
        enums = api.enum_definition_count(),
        unions = api.discriminated_union_count(),
        "Loaded API definition"
    );

    let unknown = api.unknown_type_references();
    if !unknown.is_empty() {
        warn!(count = unknown.len(), types = ?unknown, "Writing unknown top-level types as black boxes");
    }
    Ok(api)
}

struct EndpointReader<'m> {
    model: &'m JavaModel,
    settings: &'m TranslationSettings,
    resolver: AnnotationResolver<'m>,
    translator: TypeTranslator<'m>,
}

impl<'m> EndpointReader<'m> {
    fn new(model: &'m JavaModel, settings: &'m TranslationSettings) -> Self {
        Self {
            model,
            settings,
            resolver: AnnotationResolver::new(model),
            translator: TypeTranslator::new(settings, model),
        }
    }

    fn create_endpoints_for_controllers(&mut self) -> Result<()> {
        let settings = self.settings;
        let controllers: Vec<&'m JavaClass> = self
            .resolver
            .find_classes_with_annotation(REST_CONTROLLER, |name| settings.is_processable_controller(name))
            .into_iter()
            .filter(|class| !class.is_annotation())
            .collect();
        debug!(controllers = controllers.len(), "Found controllers");

        for controller in controllers {
            let group = self.create_endpoint_group(controller)?;
            if group.endpoint_count() == 0 {
                warn!(controller = controller.name(), "Controller has no endpoints");
            }
            self.translator.api_mut().add_endpoint_group(group);
        }
        Ok(())
    }

    #[instrument(skip(self, controller), fields(controller = controller.name()))]
    fn create_endpoint_group(&mut self, controller: &'m JavaClass) -> Result<EndpointGroup> {
        let name = self
            .settings
            .name_translator
            .translate_endpoint_group_name(controller.name());
        let mut group = EndpointGroup::new(name);

        let model = self.model;
        for level in model.classes_upwards_from(BoundClass::unbound(controller))? {
            for method in level.class.public_methods() {
                if method.is_static() || !self.resolver.has_annotation(method, REQUEST_MAPPING) {
                    continue;
                }
                let endpoint = self.create_endpoint(method, controller, &level)?;
                debug!(endpoint = %endpoint, "Read endpoint");
                if !group.add_endpoint(endpoint) {
                    debug!(method = method.name.as_str(), "Endpoint already declared further down, skipping");
                }
            }
        }
        Ok(group)
    }

    fn create_endpoint(&mut self, method: &'m JavaMethod, controller: &JavaClass, level: &BoundClass<'m>) -> Result<Endpoint> {
        let env = level
            .environment
            .clone()
            .merge(&method.environment(level.class));

        let response_body = if method.return_type.is_void() {
            None
        } else {
            let return_type = self.unwrap_return_type(&method.return_type);
            Some(self.translator.translate_element_type(return_type, method, &env)?)
        };

        let mut parameters = Vec::new();
        for (index, parameter) in method.parameters.iter().enumerate() {
            if let Some(p) = self.parse_parameter(parameter, index, method, controller, &env)? {
                parameters.push(p);
            }
        }

        Ok(Endpoint {
            name: method.name.clone(),
            uri_template: self.resolve_uri_template(method, controller)?,
            method: self.resolve_request_method(method, level.class),
            response_body,
            parameters,
            generate_url_method: self.settings.is_url_endpoint(controller.name(), &method.name),
        })
    }

    /// The payload type of `HttpEntity<T>`, `ResponseEntity<T>` and `Callable<T>`.
    fn unwrap_return_type<'t>(&self, ty: &'t JavaType) -> &'t JavaType {
        if let JavaType::Parameterized { base, arguments } = ty {
            let wrapped = [HTTP_ENTITY, RESPONSE_ENTITY, CALLABLE]
                .iter()
                .any(|wrapper| self.model.is_instance_of(base, wrapper));
            if let (true, [argument]) = (wrapped, arguments.as_slice()) {
                return argument;
            }
        }
        ty
    }

    /// Parameters not bound from the request body, query or path are skipped
    /// without translating their type.
    fn parse_parameter(
        &mut self,
        parameter: &JavaParameter,
        index: usize,
        method: &JavaMethod,
        controller: &JavaClass,
        env: &TypeEnvironment,
    ) -> Result<Option<EndpointParameter>> {
        let missing_name = || TranslationError::MissingParameterName {
            class: controller.name().to_string(),
            method: method.name.clone(),
            index,
        };

        if self.resolver.has_annotation(parameter, REQUEST_BODY) {
            let name = parameter.name.clone().ok_or_else(missing_name)?;
            let ty = self.translator.translate_element_type(&parameter.ty, parameter, env)?;
            return Ok(Some(EndpointParameter::RequestBody { name, ty }));
        }

        for kind in [REQUEST_PARAM, PATH_VARIABLE] {
            let Some(annotation) = self.resolver.find_annotation(parameter, kind) else {
                continue;
            };
            let declared = annotation
                .get_string("name")
                .or_else(|| annotation.get_string("value"))
                .map(str::to_string);
            let name = parameter
                .name
                .clone()
                .or_else(|| declared.clone())
                .ok_or_else(missing_name)?;
            let external = declared.unwrap_or_else(|| name.clone());
            let ty = self.translator.translate_element_type(&parameter.ty, parameter, env)?;

            return Ok(Some(if kind == REQUEST_PARAM {
                EndpointParameter::RequestParam { name, query_parameter: external, ty }
            } else {
                EndpointParameter::PathVariable { name, path_variable: external, ty }
            }));
        }
        Ok(None)
    }

    fn resolve_uri_template(&self, method: &JavaMethod, controller: &JavaClass) -> Result<UriTemplate> {
        let class_url = self.find_request_mapping_path(controller);
        let method_url = self.find_request_mapping_path(method);
        let url = self.settings.normalize_url(&format!("{}{}", class_url, method_url));
        parse_spring_uri_template(&url)
    }

    fn find_request_mapping_path(&self, element: &(impl AnnotatedElement + ?Sized)) -> String {
        let path = self
            .resolver
            .find_annotation(element, REQUEST_MAPPING)
            .and_then(|mapping| mapping.get_string("path").or_else(|| mapping.get_string("value")))
            .unwrap_or_default();
        if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }
    }

    /// The method's own mapping decides, then the declaring class', then GET.
    fn resolve_request_method(&self, method: &JavaMethod, declaring_class: &JavaClass) -> HttpMethod {
        self.find_http_method(method)
            .or_else(|| self.find_http_method(declaring_class))
            .unwrap_or_default()
    }

    fn find_http_method(&self, element: &(impl AnnotatedElement + ?Sized)) -> Option<HttpMethod> {
        let mapping = self.resolver.find_annotation(element, REQUEST_MAPPING)?;
        let first = mapping.get_enums("method").into_iter().next()?;
        match first.constant.parse() {
            Ok(method) => Some(method),
            Err(e) => {
                warn!(error = %e, "Ignoring request method");
                None
            }
        }
    }

    fn translate_roots(&mut self) -> Result<()> {
        let settings = self.settings;
        for root in &settings.roots {
            let ty = self
                .translator
                .translate_type(&JavaType::basic(root.as_str()), &TypeEnvironment::empty())?;
            if let ApiType::Class(name) = &ty {
                if !self.translator.api().contains_type(name) {
                    warn!(root = root.as_str(), "Root class not found");
                }
            }
        }
        Ok(())
    }
}
