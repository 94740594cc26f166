//! Public method resolution.
//!
//! The scan depends only on [`MethodResolver`]. [`ClasspathResolver`] answers
//! from class files found on a classpath of jars and mirrors what
//! `Class.getMethods()` reports: public declared methods plus everything
//! public inherited from superclasses and superinterfaces.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::archive::Archive;
use crate::classfile::{ACC_INTERFACE, ACC_PUBLIC, ACC_STATIC, ClassFile, MethodInfo};
use crate::error::Result;
use crate::filter::class_name_to_entry_path;

/// Well-known platform types, used when no JDK class files are on the
/// classpath. Public methods follow JDK 17.
struct PlatformType {
    name: &'static str,
    is_interface: bool,
    super_name: Option<&'static str>,
    interfaces: &'static [&'static str],
    /// `(name, descriptor, is_static)`
    methods: &'static [(&'static str, &'static str, bool)],
}

const OBJECT: &str = "java/lang/Object";
const THROWABLE: &str = "java/lang/Throwable";
const EXCEPTION: &str = "java/lang/Exception";
const RUNTIME_EXCEPTION: &str = "java/lang/RuntimeException";
const SERIALIZABLE: &str = "java/io/Serializable";
const AUTO_CLOSEABLE: &str = "java/lang/AutoCloseable";

const PLATFORM_TYPES: &[PlatformType] = &[
    PlatformType {
        name: OBJECT,
        is_interface: false,
        super_name: None,
        interfaces: &[],
        methods: &[
            ("equals", "(Ljava/lang/Object;)Z", false),
            ("getClass", "()Ljava/lang/Class;", false),
            ("hashCode", "()I", false),
            ("notify", "()V", false),
            ("notifyAll", "()V", false),
            ("toString", "()Ljava/lang/String;", false),
            ("wait", "()V", false),
            ("wait", "(J)V", false),
            ("wait", "(JI)V", false),
        ],
    },
    PlatformType {
        name: SERIALIZABLE,
        is_interface: true,
        super_name: Some(OBJECT),
        interfaces: &[],
        methods: &[],
    },
    PlatformType {
        name: "java/lang/Cloneable",
        is_interface: true,
        super_name: Some(OBJECT),
        interfaces: &[],
        methods: &[],
    },
    PlatformType {
        name: "java/lang/Comparable",
        is_interface: true,
        super_name: Some(OBJECT),
        interfaces: &[],
        methods: &[("compareTo", "(Ljava/lang/Object;)I", false)],
    },
    PlatformType {
        name: "java/lang/Runnable",
        is_interface: true,
        super_name: Some(OBJECT),
        interfaces: &[],
        methods: &[("run", "()V", false)],
    },
    PlatformType {
        name: AUTO_CLOSEABLE,
        is_interface: true,
        super_name: Some(OBJECT),
        interfaces: &[],
        methods: &[("close", "()V", false)],
    },
    PlatformType {
        name: "java/io/Closeable",
        is_interface: true,
        super_name: Some(OBJECT),
        interfaces: &[AUTO_CLOSEABLE],
        methods: &[("close", "()V", false)],
    },
    PlatformType {
        name: "java/lang/constant/Constable",
        is_interface: true,
        super_name: Some(OBJECT),
        interfaces: &[],
        methods: &[("describeConstable", "()Ljava/util/Optional;", false)],
    },
    PlatformType {
        name: "java/lang/Enum",
        is_interface: false,
        super_name: Some(OBJECT),
        interfaces: &["java/lang/constant/Constable", "java/lang/Comparable", SERIALIZABLE],
        methods: &[
            ("name", "()Ljava/lang/String;", false),
            ("ordinal", "()I", false),
            ("toString", "()Ljava/lang/String;", false),
            ("equals", "(Ljava/lang/Object;)Z", false),
            ("hashCode", "()I", false),
            ("compareTo", "(Ljava/lang/Enum;)I", false),
            // bridge
            ("compareTo", "(Ljava/lang/Object;)I", false),
            ("getDeclaringClass", "()Ljava/lang/Class;", false),
            ("describeConstable", "()Ljava/util/Optional;", false),
            ("valueOf", "(Ljava/lang/Class;Ljava/lang/String;)Ljava/lang/Enum;", true),
        ],
    },
    PlatformType {
        name: "java/lang/Record",
        is_interface: false,
        super_name: Some(OBJECT),
        interfaces: &[],
        methods: &[
            ("equals", "(Ljava/lang/Object;)Z", false),
            ("hashCode", "()I", false),
            ("toString", "()Ljava/lang/String;", false),
        ],
    },
    PlatformType {
        name: THROWABLE,
        is_interface: false,
        super_name: Some(OBJECT),
        interfaces: &[SERIALIZABLE],
        methods: &[
            ("getMessage", "()Ljava/lang/String;", false),
            ("getLocalizedMessage", "()Ljava/lang/String;", false),
            ("getCause", "()Ljava/lang/Throwable;", false),
            ("initCause", "(Ljava/lang/Throwable;)Ljava/lang/Throwable;", false),
            ("toString", "()Ljava/lang/String;", false),
            ("printStackTrace", "()V", false),
            ("printStackTrace", "(Ljava/io/PrintStream;)V", false),
            ("printStackTrace", "(Ljava/io/PrintWriter;)V", false),
            ("fillInStackTrace", "()Ljava/lang/Throwable;", false),
            ("getStackTrace", "()[Ljava/lang/StackTraceElement;", false),
            ("setStackTrace", "([Ljava/lang/StackTraceElement;)V", false),
            ("addSuppressed", "(Ljava/lang/Throwable;)V", false),
            ("getSuppressed", "()[Ljava/lang/Throwable;", false),
        ],
    },
    PlatformType {
        name: EXCEPTION,
        is_interface: false,
        super_name: Some(THROWABLE),
        interfaces: &[],
        methods: &[],
    },
    PlatformType {
        name: "java/lang/Error",
        is_interface: false,
        super_name: Some(THROWABLE),
        interfaces: &[],
        methods: &[],
    },
    PlatformType {
        name: RUNTIME_EXCEPTION,
        is_interface: false,
        super_name: Some(EXCEPTION),
        interfaces: &[],
        methods: &[],
    },
    PlatformType {
        name: "java/io/IOException",
        is_interface: false,
        super_name: Some(EXCEPTION),
        interfaces: &[],
        methods: &[],
    },
    PlatformType {
        name: "java/lang/IllegalArgumentException",
        is_interface: false,
        super_name: Some(RUNTIME_EXCEPTION),
        interfaces: &[],
        methods: &[],
    },
    PlatformType {
        name: "java/lang/IllegalStateException",
        is_interface: false,
        super_name: Some(RUNTIME_EXCEPTION),
        interfaces: &[],
        methods: &[],
    },
    PlatformType {
        name: "java/lang/UnsupportedOperationException",
        is_interface: false,
        super_name: Some(RUNTIME_EXCEPTION),
        interfaces: &[],
        methods: &[],
    },
];

impl PlatformType {
    fn find(internal_name: &str) -> Option<&'static PlatformType> {
        PLATFORM_TYPES.iter().find(|t| t.name == internal_name)
    }

    fn to_class_file(&self) -> ClassFile {
        let access = if self.is_interface {
            ACC_PUBLIC | ACC_INTERFACE
        } else {
            ACC_PUBLIC
        };
        ClassFile {
            major_version: 61,
            access,
            this_class: self.name.to_string(),
            // Interfaces name Object as their superclass in class files too.
            super_class: self.super_name.map(str::to_string),
            interfaces: self.interfaces.iter().map(|i| i.to_string()).collect(),
            methods: self
                .methods
                .iter()
                .map(|(name, descriptor, is_static)| MethodInfo {
                    access: if *is_static {
                        ACC_PUBLIC | ACC_STATIC
                    } else {
                        ACC_PUBLIC
                    },
                    name: (*name).to_string(),
                    descriptor: (*descriptor).to_string(),
                })
                .collect(),
        }
    }
}

pub trait MethodResolver {
    /// Public method count of `class_name` (dotted form), or `None` when the
    /// class or any of its supertypes cannot be resolved.
    fn method_count(&mut self, class_name: &str) -> Option<usize>;
}

impl MethodResolver for HashMap<String, usize> {
    fn method_count(&mut self, class_name: &str) -> Option<usize> {
        self.get(class_name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MethodSig {
    pub name: String,
    pub descriptor: String,
    pub is_static: bool,
}

impl From<&MethodInfo> for MethodSig {
    fn from(method: &MethodInfo) -> Self {
        Self {
            name: method.name.clone(),
            descriptor: method.descriptor.clone(),
            is_static: method.is_static(),
        }
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            write!(f, "static ")?;
        }
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// Public methods keyed by name and descriptor; the first insert wins.
#[derive(Debug, Clone, Default)]
pub struct PublicMethods {
    by_signature: BTreeMap<(String, String), MethodSig>,
}

impl PublicMethods {
    fn insert(&mut self, sig: MethodSig) {
        self.by_signature
            .entry((sig.name.clone(), sig.descriptor.clone()))
            .or_insert(sig);
    }

    fn inherit(&mut self, from: &PublicMethods, keep: impl Fn(&MethodSig) -> bool) {
        for sig in from.iter().filter(|s| keep(s)) {
            self.insert(sig.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.by_signature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_signature.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodSig> {
        self.by_signature.values()
    }
}

/// A jar or module on the classpath. Class files live under `prefix`
/// (`classes/` in a `.jmod`, empty in a jar).
#[derive(Debug, Clone)]
pub struct ClasspathElement {
    archive: Archive,
    prefix: String,
}

impl ClasspathElement {
    pub fn jar(archive: Archive) -> Self {
        Self {
            archive,
            prefix: String::new(),
        }
    }

    pub fn with_prefix(archive: Archive, prefix: &str) -> Self {
        Self {
            archive,
            prefix: prefix.to_string(),
        }
    }
}

/// Ordered list of jars and modules searched for class files; the first
/// match wins.
#[derive(Debug, Default)]
pub struct Classpath {
    elements: Vec<ClasspathElement>,
}

impl Classpath {
    pub fn open(paths: &[PathBuf]) -> Result<Self> {
        let mut classpath = Self::default();
        for path in paths {
            classpath.push(ClasspathElement::jar(Archive::open(path)?));
        }
        Ok(classpath)
    }

    pub fn push(&mut self, element: ClasspathElement) {
        self.elements.push(element);
    }

    pub fn extend(&mut self, other: Classpath) {
        self.elements.extend(other.elements);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Class file bytes for an internal name such as `org/example/Foo`.
    pub fn find_class(&mut self, internal_name: &str) -> Option<Vec<u8>> {
        let entry = class_name_to_entry_path(internal_name);
        for element in &mut self.elements {
            let name = format!("{}{entry}", element.prefix);
            match element.archive.read_by_name(&name) {
                Ok(Some(bytes)) => return Some(bytes),
                Ok(None) => continue,
                Err(_) => return None,
            }
        }
        None
    }
}

/// Class files of the JDK at `java_home`: `jmods/java.base.jmod` on JDK 9+,
/// `jre/lib/rt.jar` or `lib/rt.jar` on JDK 8. `None` when neither exists.
pub fn platform_classpath(java_home: &Path) -> Result<Option<ClasspathElement>> {
    let jmod = java_home.join("jmods").join("java.base.jmod");
    if jmod.is_file() {
        return Ok(Some(ClasspathElement::with_prefix(
            Archive::open(&jmod)?,
            "classes/",
        )));
    }
    for rt in [
        java_home.join("jre").join("lib").join("rt.jar"),
        java_home.join("lib").join("rt.jar"),
    ] {
        if rt.is_file() {
            return Ok(Some(ClasspathElement::jar(Archive::open(&rt)?)));
        }
    }
    Ok(None)
}

/// Resolves classes against a [`Classpath`], memoising every answer.
///
/// Missing classes, missing supertypes, malformed class files and cyclic
/// hierarchies all resolve to `None`; callers cannot tell them apart.
#[derive(Debug)]
pub struct ClasspathResolver {
    classpath: Classpath,
    resolved: HashMap<String, Option<Rc<PublicMethods>>>,
    in_progress: HashSet<String>,
}

impl ClasspathResolver {
    pub fn new(classpath: Classpath) -> Self {
        Self {
            classpath,
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Classpath of the already opened `artifact`, sharing its mapping,
    /// followed by `extra`.
    pub fn for_archive(artifact: &Archive, extra: Classpath) -> Self {
        let mut classpath = Classpath::default();
        classpath.push(ClasspathElement::jar(artifact.clone()));
        classpath.extend(extra);
        Self::new(classpath)
    }

    /// Opens `artifact` and `extra` jars.
    pub fn for_artifact(artifact: &Path, extra: &[PathBuf]) -> Result<Self> {
        let archive = Archive::open(artifact)?;
        Ok(Self::for_archive(&archive, Classpath::open(extra)?))
    }

    pub fn public_methods(&mut self, class_name: &str) -> Option<Rc<PublicMethods>> {
        self.resolve(&class_name.replace('.', "/"))
    }

    fn resolve(&mut self, internal_name: &str) -> Option<Rc<PublicMethods>> {
        if let Some(cached) = self.resolved.get(internal_name) {
            return cached.clone();
        }
        if !self.in_progress.insert(internal_name.to_string()) {
            return None;
        }

        let result = self.load(internal_name);
        self.in_progress.remove(internal_name);
        self.resolved
            .insert(internal_name.to_string(), result.clone());
        result
    }

    fn load(&mut self, internal_name: &str) -> Option<Rc<PublicMethods>> {
        let class = match self.classpath.find_class(internal_name) {
            Some(bytes) => ClassFile::parse(&bytes).ok()?,
            None => PlatformType::find(internal_name)?.to_class_file(),
        };
        if class.this_class != internal_name {
            return None;
        }

        let mut methods = PublicMethods::default();
        for method in class
            .methods
            .iter()
            .filter(|m| m.is_public() && !m.is_initializer())
        {
            methods.insert(MethodSig::from(method));
        }

        // Interfaces do not expose Object's methods.
        if !class.is_interface()
            && let Some(super_name) = class.super_class.as_deref()
        {
            let inherited = self.resolve(super_name)?;
            methods.inherit(&inherited, |_| true);
        }

        // Static interface methods are not inherited.
        for interface in &class.interfaces {
            let inherited = self.resolve(interface)?;
            methods.inherit(&inherited, |sig| !sig.is_static);
        }

        Some(Rc::new(methods))
    }
}

impl MethodResolver for ClasspathResolver {
    fn method_count(&mut self, class_name: &str) -> Option<usize> {
        self.public_methods(class_name).map(|methods| methods.len())
    }
}
