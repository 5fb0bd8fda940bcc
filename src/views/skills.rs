use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub name: &'static str,
    pub icon_url: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkillCategory {
    pub name: &'static str,
    pub skills: &'static [Skill],
}

/// Technology stack behind the product, in display order.
pub const SKILLS: &[SkillCategory] = &[
    SkillCategory {
        name: "Frontend",
        skills: &[
            Skill {
                name: "React",
                icon_url: "https://upload.wikimedia.org/wikipedia/commons/a/a7/React-icon.svg",
                description: "For building dynamic, component-based UIs.",
            },
            Skill {
                name: "Tailwind CSS",
                icon_url: "https://upload.wikimedia.org/wikipedia/commons/d/d5/Tailwind_CSS_Logo.svg",
                description: "A utility-first CSS framework for rapid styling.",
            },
            Skill {
                name: "Framer Motion",
                icon_url: "https://static.framer.com/images/logos/framer-logo-icon.png",
                description: "For fluid animations and complex gestures.",
            },
        ],
    },
    SkillCategory {
        name: "Backend & API",
        skills: &[
            Skill {
                name: "FastAPI",
                icon_url: "https://fastapi.tiangolo.com/img/logo-margin/logo-teal.png",
                description: "High-performance Python web framework for building APIs.",
            },
            Skill {
                name: "Docker",
                icon_url: "https://www.docker.com/wp-content/uploads/2022/03/Moby-logo.png",
                description: "Containerization for consistent deployment environments.",
            },
        ],
    },
    SkillCategory {
        name: "NLP & Machine Learning",
        skills: &[
            Skill {
                name: "Hugging Face",
                icon_url: "https://huggingface.co/front/assets/huggingface_logo-noborder.svg",
                description: "Ecosystem for state-of-the-art Transformers models.",
            },
            Skill {
                name: "PyTorch",
                icon_url: "https://upload.wikimedia.org/wikipedia/commons/9/96/Pytorch_logo.png",
                description: "Primary deep learning framework for model fine-tuning.",
            },
            Skill {
                name: "spaCy",
                icon_url: "https://spacy.io/images/logo.svg",
                description: "Industrial-strength NLP for preprocessing and NER.",
            },
            Skill {
                name: "NLTK",
                icon_url: "https://www.nltk.org/_static/nltk_logo_small.png",
                description: "Library for text processing tasks like tokenization.",
            },
        ],
    },
    SkillCategory {
        name: "MLOps & Deployment",
        skills: &[
            Skill {
                name: "GitHub Actions",
                icon_url: "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png",
                description: "CI/CD for automated testing and deployment pipelines.",
            },
            Skill {
                name: "AWS S3",
                icon_url: "https://upload.wikimedia.org/wikipedia/commons/a/a9/Amazon_S3_logo.svg",
                description: "Scalable object storage for models and documents.",
            },
            Skill {
                name: "GCP Vertex AI",
                icon_url: "https://cloud.google.com/images/products/vertex-ai/vertex-ai-lockup-rgb.svg",
                description: "Managed platform for ML model deployment and serving.",
            },
        ],
    },
];
