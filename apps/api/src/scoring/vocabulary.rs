//! Curated word lists read by the dimension scorers.
//!
//! Entries are lower-case ASCII: normalized text has its accents folded, so
//! "par conséquent" is listed as "par consequent".

/// Technical terms recognized as whole words (language, framework, ML and data names).
pub const TECHNICAL_TERMS: &[&str] = &[
    "html",
    "css",
    "javascript",
    "typescript",
    "python",
    "java",
    "kotlin",
    "swift",
    "php",
    "react",
    "react native",
    "vue",
    "angular",
    "node.js",
    "flask",
    "django",
    "spring",
    "laravel",
    "flutter",
    "android",
    "ios",
    "tensorflow",
    "pytorch",
    "keras",
    "scikit-learn",
    "opencv",
    "pandas",
    "numpy",
    "machine learning",
    "deep learning",
    "sql",
    "mysql",
    "postgresql",
    "mongodb",
    "firebase",
    "database",
    "api",
    "rest",
    "graphql",
    "docker",
    "kubernetes",
    "git",
];

/// Discourse markers counted by the coherence scorer.
pub const TRANSITION_WORDS: &[&str] = &[
    "premierement",
    "deuxiemement",
    "ensuite",
    "en conclusion",
    "par consequent",
    "de plus",
    "cependant",
    "en effet",
    "finalement",
    "firstly",
    "secondly",
    "furthermore",
    "moreover",
    "therefore",
    "in conclusion",
];
