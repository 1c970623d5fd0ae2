//! Target classes: the plain types whose methods are exposed for dispatch.
//!
//! A [`TargetClass`] pairs each dispatchable method's declared signature
//! with a handler closure, built once at registration time. Dispatch by name
//! is a lookup in that table. [`ClassRegistry`] plays the part of the set of
//! loadable types a controller can be pointed at.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::SignatureError;
use crate::signature::{MethodSignature, ParameterDescriptor};
use crate::value::Value;

/// A constructed target instance.
pub type Instance = Box<dyn Any>;

type ConstructFn = Rc<dyn Fn(Vec<Value>) -> Result<Instance, String>>;
type HandlerFn = Rc<dyn Fn(&mut dyn Any, Vec<Value>) -> Result<Value, String>>;

/// A dispatchable method: its schema plus the code behind it.
#[derive(Clone)]
pub struct TargetMethod {
    signature: MethodSignature,
    handler: HandlerFn,
}

impl TargetMethod {
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Call the method with positional arguments.
    pub fn invoke(&self, instance: &mut dyn Any, args: Vec<Value>) -> Result<Value, String> {
        (self.handler)(instance, args)
    }
}

impl fmt::Debug for TargetMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TargetMethod({})", self.signature)
    }
}

/// A registered target type.
pub struct TargetClass {
    name: String,
    constructor: Option<MethodSignature>,
    construct: ConstructFn,
    methods: IndexMap<String, TargetMethod>,
}

impl TargetClass {
    /// Start describing a class. `factory` builds an instance when the class
    /// declares no constructor.
    pub fn builder<T, F>(name: impl Into<String>, factory: F) -> ClassBuilder<T>
    where
        T: 'static,
        F: Fn() -> T + 'static,
    {
        ClassBuilder {
            name: name.into(),
            constructor: None,
            construct: Rc::new(move |_args: Vec<Value>| {
                Ok::<Instance, String>(Box::new(factory()))
            }),
            methods: IndexMap::new(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self, name: &str) -> Option<&TargetMethod> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names in registration order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(|k| k.as_str())
    }

    pub fn constructor_signature(&self) -> Option<&MethodSignature> {
        self.constructor.as_ref()
    }

    /// Build an instance from positional constructor arguments.
    pub fn instantiate(&self, args: Vec<Value>) -> Result<Instance, String> {
        (self.construct)(args)
    }
}

impl fmt::Debug for TargetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetClass")
            .field("name", &self.name)
            .field("constructor", &self.constructor)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder returned by [`TargetClass::builder`].
pub struct ClassBuilder<T> {
    name: String,
    constructor: Option<MethodSignature>,
    construct: ConstructFn,
    methods: IndexMap<String, TargetMethod>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> ClassBuilder<T> {
    /// Declare a constructor from a parameter list such as
    /// `gateway: string, retries: int = 3`.
    pub fn constructor<F>(self, parameters: &str, build: F) -> Result<Self, SignatureError>
    where
        F: Fn(Vec<Value>) -> Result<T, String> + 'static,
    {
        let signature = MethodSignature::parse(&format!("construct({})", parameters))?;
        self.constructor_with(signature.parameters().to_vec(), build)
    }

    pub fn constructor_with<F>(
        mut self,
        parameters: Vec<ParameterDescriptor>,
        build: F,
    ) -> Result<Self, SignatureError>
    where
        F: Fn(Vec<Value>) -> Result<T, String> + 'static,
    {
        self.constructor = Some(MethodSignature::new("construct", parameters)?);
        self.construct =
            Rc::new(move |args: Vec<Value>| build(args).map(|t| Box::new(t) as Instance));
        Ok(self)
    }

    /// Register a method from its manifest line, e.g. `intParam(param: int)`.
    pub fn method<F>(self, signature: &str, handler: F) -> Result<Self, SignatureError>
    where
        F: Fn(&mut T, Vec<Value>) -> Result<Value, String> + 'static,
    {
        let signature = MethodSignature::parse(signature)?;
        Ok(self.method_with(signature, handler))
    }

    pub fn method_with<F>(mut self, signature: MethodSignature, handler: F) -> Self
    where
        F: Fn(&mut T, Vec<Value>) -> Result<Value, String> + 'static,
    {
        let class_name = self.name.clone();
        let handler: HandlerFn = Rc::new(move |instance: &mut dyn Any, args: Vec<Value>| {
            let target = instance
                .downcast_mut::<T>()
                .ok_or_else(|| format!("instance is not a {}", class_name))?;
            handler(target, args)
        });
        self.methods.insert(
            signature.name().to_string(),
            TargetMethod { signature, handler },
        );
        self
    }

    pub fn build(self) -> TargetClass {
        TargetClass {
            name: self.name,
            constructor: self.constructor,
            construct: self.construct,
            methods: self.methods,
        }
    }
}

/// Registry of target classes, keyed by class name.
#[derive(Debug, Default, Clone)]
pub struct ClassRegistry {
    classes: HashMap<String, Rc<TargetClass>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Register a class, replacing any class with the same name.
    pub fn register(&mut self, class: TargetClass) -> Rc<TargetClass> {
        let class = Rc::new(class);
        self.classes.insert(class.name.clone(), class.clone());
        class
    }

    pub fn get(&self, name: &str) -> Option<Rc<TargetClass>> {
        self.classes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered class names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}
