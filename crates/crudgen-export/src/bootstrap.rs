//! Framework bootstrap files for complete projects.
//!
//! Each framework has a fixed table of `(path, template)` pairs. Paths are
//! templates too, so package-derived directories resolve the same way as
//! file contents.

use serde::Serialize;
use tracing::debug;

use crudgen_core::{naming, Framework, GeneratedFile, Language, PackagingError};

use crate::templates::TemplateEngine;

/// Values every bootstrap template may reference.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapData {
    /// Dotted package name, `com.example.shop`.
    pub package_name: String,
    /// Package as a directory, `com/example/shop`.
    pub package_path: String,
    /// PascalCase project name, `Shop`.
    pub project_name: String,
    /// Python application package, `shop`.
    pub app_name: String,
    /// C# root namespace, `Com.Example.Shop`.
    pub namespace: String,
    /// Number of entities in the model.
    pub class_count: usize,
}

impl BootstrapData {
    pub fn new(package_name: &str, class_count: usize) -> Self {
        Self {
            package_name: package_name.to_string(),
            package_path: naming::package_path(package_name),
            project_name: naming::project_name(package_name),
            app_name: naming::python_app(package_name),
            namespace: naming::dotnet_namespace(package_name),
            class_count,
        }
    }
}

/// Render the bootstrap files of `framework`.
pub fn bootstrap_files(framework: Framework, data: &BootstrapData) -> Result<Vec<GeneratedFile>, PackagingError> {
    let engine = TemplateEngine::new();
    let files = templates_for(framework)
        .iter()
        .map(|(path, template)| {
            let path = engine.render_string(path, data)?;
            let content = engine.render_string(template, data)?;
            let language = Language::from_path(&path);
            Ok(GeneratedFile::new(path, content, language))
        })
        .collect::<Result<Vec<_>, PackagingError>>()?;
    debug!(framework = %framework, files = files.len(), "rendered bootstrap files");
    Ok(files)
}

fn templates_for(framework: Framework) -> &'static [(&'static str, &'static str)] {
    match framework {
        Framework::SpringBoot => SPRING_BOOT,
        Framework::Django => DJANGO,
        Framework::Flask => FLASK,
        Framework::Dotnet => DOTNET,
        Framework::Express => EXPRESS,
    }
}

const SPRING_BOOT: &[(&str, &str)] = &[
    ("pom.xml", SPRING_POM),
    ("src/main/java/{{package_path}}/Application.java", SPRING_APPLICATION),
    ("src/main/resources/application.yml", SPRING_APPLICATION_YML),
];

const SPRING_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>3.2.5</version>
        <relativePath/>
    </parent>

    <groupId>{{package_name}}</groupId>
    <artifactId>{{kebab_case project_name}}</artifactId>
    <version>0.0.1-SNAPSHOT</version>
    <name>{{project_name}}</name>

    <properties>
        <java.version>17</java.version>
    </properties>

    <dependencies>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-web</artifactId>
        </dependency>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-data-jpa</artifactId>
        </dependency>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-validation</artifactId>
        </dependency>
        <dependency>
            <groupId>com.h2database</groupId>
            <artifactId>h2</artifactId>
            <scope>runtime</scope>
        </dependency>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-test</artifactId>
            <scope>test</scope>
        </dependency>
    </dependencies>

    <build>
        <plugins>
            <plugin>
                <groupId>org.springframework.boot</groupId>
                <artifactId>spring-boot-maven-plugin</artifactId>
            </plugin>
        </plugins>
    </build>
</project>
"#;

const SPRING_APPLICATION: &str = r#"package {{package_name}};

import org.springframework.boot.SpringApplication;
import org.springframework.boot.autoconfigure.SpringBootApplication;

@SpringBootApplication
public class Application {

    public static void main(String[] args) {
        SpringApplication.run(Application.class, args);
    }
}
"#;

const SPRING_APPLICATION_YML: &str = r#"spring:
  application:
    name: {{kebab_case project_name}}
  datasource:
    url: jdbc:h2:mem:{{snake_case project_name}}
    driver-class-name: org.h2.Driver
  jpa:
    hibernate:
      ddl-auto: update
    open-in-view: false

server:
  port: 8080
"#;

const DJANGO: &[(&str, &str)] = &[
    ("manage.py", DJANGO_MANAGE),
    ("config/__init__.py", ""),
    ("config/settings.py", DJANGO_SETTINGS),
    ("config/urls.py", DJANGO_URLS),
    ("requirements.txt", DJANGO_REQUIREMENTS),
    ("{{app_name}}/apps.py", DJANGO_APPS),
    ("{{app_name}}/__init__.py", ""),
];

const DJANGO_MANAGE: &str = r#"#!/usr/bin/env python
import os
import sys


def main():
    os.environ.setdefault('DJANGO_SETTINGS_MODULE', 'config.settings')
    from django.core.management import execute_from_command_line
    execute_from_command_line(sys.argv)


if __name__ == '__main__':
    main()
"#;

const DJANGO_SETTINGS: &str = r#"import os
from pathlib import Path

BASE_DIR = Path(__file__).resolve().parent.parent

SECRET_KEY = os.environ.get('DJANGO_SECRET_KEY', 'change-me')
DEBUG = os.environ.get('DJANGO_DEBUG', '1') == '1'
ALLOWED_HOSTS = ['*']

INSTALLED_APPS = [
    'django.contrib.contenttypes',
    'django.contrib.auth',
    'rest_framework',
    '{{app_name}}',
]

MIDDLEWARE = [
    'django.middleware.common.CommonMiddleware',
]

ROOT_URLCONF = 'config.urls'

DATABASES = {
    'default': {
        'ENGINE': 'django.db.backends.sqlite3',
        'NAME': BASE_DIR / 'db.sqlite3',
    }
}

DEFAULT_AUTO_FIELD = 'django.db.models.BigAutoField'
USE_TZ = True

REST_FRAMEWORK = {
    'UNAUTHENTICATED_USER': None,
}
"#;

const DJANGO_URLS: &str = r#"from django.urls import include, path

urlpatterns = [
    path('api/', include('{{app_name}}.urls')),
]
"#;

const DJANGO_REQUIREMENTS: &str = "Django>=4.2,<5.0\ndjangorestframework>=3.14\n";

const DJANGO_APPS: &str = r#"from django.apps import AppConfig


class {{project_name}}Config(AppConfig):
    default_auto_field = 'django.db.models.BigAutoField'
    name = '{{app_name}}'
"#;

const FLASK: &[(&str, &str)] = &[
    ("app/__init__.py", FLASK_APP),
    ("run.py", FLASK_RUN),
    ("config.py", FLASK_CONFIG),
    ("requirements.txt", FLASK_REQUIREMENTS),
];

const FLASK_APP: &str = r#"from flask import Flask

from config import Config
from .extensions import db
from .routes import register_blueprints


def create_app(config_class=Config):
    app = Flask(__name__)
    app.config.from_object(config_class)

    db.init_app(app)
    register_blueprints(app)

    with app.app_context():
        from . import models  # noqa: F401
        db.create_all()

    return app
"#;

const FLASK_RUN: &str = r#"from app import create_app

app = create_app()

if __name__ == '__main__':
    app.run(debug=True)
"#;

const FLASK_CONFIG: &str = r#"import os


class Config:
    SQLALCHEMY_DATABASE_URI = os.environ.get('DATABASE_URL', 'sqlite:///{{app_name}}.db')
    SQLALCHEMY_TRACK_MODIFICATIONS = False
"#;

const FLASK_REQUIREMENTS: &str = "Flask>=3.0\nFlask-SQLAlchemy>=3.1\n";

const DOTNET: &[(&str, &str)] = &[
    ("{{project_name}}.csproj", DOTNET_CSPROJ),
    ("Program.cs", DOTNET_PROGRAM),
    ("appsettings.json", DOTNET_APPSETTINGS),
];

const DOTNET_CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">

  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Nullable>enable</Nullable>
    <ImplicitUsings>disable</ImplicitUsings>
    <RootNamespace>{{namespace}}</RootNamespace>
  </PropertyGroup>

  <ItemGroup>
    <PackageReference Include="Microsoft.EntityFrameworkCore.Sqlite" Version="8.0.4" />
  </ItemGroup>

</Project>
"#;

const DOTNET_PROGRAM: &str = r#"using Microsoft.AspNetCore.Builder;
using Microsoft.EntityFrameworkCore;
using Microsoft.Extensions.Configuration;
using Microsoft.Extensions.DependencyInjection;
using {{namespace}}.Data;
using {{namespace}}.Exceptions;
using {{namespace}}.Extensions;

var builder = WebApplication.CreateBuilder(args);

builder.Services.AddControllers(options => options.Filters.Add<NotFoundExceptionFilter>());
builder.Services.AddDbContext<AppDbContext>(options =>
    options.UseSqlite(builder.Configuration.GetConnectionString("Default")));
builder.Services.AddDomainServices();

var app = builder.Build();

using (var scope = app.Services.CreateScope())
{
    scope.ServiceProvider.GetRequiredService<AppDbContext>().Database.EnsureCreated();
}

app.MapControllers();
app.Run();
"#;

const DOTNET_APPSETTINGS: &str = r#"{
  "ConnectionStrings": {
    "Default": "Data Source={{snake_case project_name}}.db"
  },
  "Logging": {
    "LogLevel": {
      "Default": "Information",
      "Microsoft.AspNetCore": "Warning"
    }
  },
  "AllowedHosts": "*"
}
"#;

const EXPRESS: &[(&str, &str)] = &[
    ("package.json", EXPRESS_PACKAGE),
    ("src/app.js", EXPRESS_APP),
    ("src/config/database.js", EXPRESS_DATABASE),
    (".env.example", EXPRESS_ENV),
];

const EXPRESS_PACKAGE: &str = r#"{
  "name": "{{kebab_case project_name}}",
  "version": "0.1.0",
  "private": true,
  "main": "src/app.js",
  "scripts": {
    "start": "node src/app.js"
  },
  "dependencies": {
    "dotenv": "^16.4.5",
    "express": "^4.19.2",
    "sequelize": "^6.37.3",
    "sqlite3": "^5.1.7"
  }
}
"#;

const EXPRESS_APP: &str = r#"require('dotenv').config();

const express = require('express');
const { sequelize } = require('./models');
const routes = require('./routes');

const app = express();
app.use(express.json());
app.use('/api', routes);

const port = process.env.PORT || 3000;

sequelize.sync().then(() => {
  app.listen(port, () => {
    console.log(`{{project_name}} listening on port ${port}`);
  });
});

module.exports = app;
"#;

const EXPRESS_DATABASE: &str = r#"module.exports = {
  dialect: process.env.DB_DIALECT || 'sqlite',
  storage: process.env.DB_STORAGE || '{{snake_case project_name}}.sqlite',
  logging: false,
};
"#;

const EXPRESS_ENV: &str = "PORT=3000\nDB_DIALECT=sqlite\nDB_STORAGE={{snake_case project_name}}.sqlite\n";

#[cfg(test)]
mod tests {
    use super::*;

    fn render(framework: Framework) -> Vec<GeneratedFile> {
        bootstrap_files(framework, &BootstrapData::new("com.example.shop", 2)).unwrap()
    }

    fn content<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
        files
            .iter()
            .find(|f| f.relative_path == path)
            .map(|f| f.content.as_str())
            .unwrap()
    }

    #[test]
    fn test_bootstrap_data() {
        let data = BootstrapData::new("com.example.shop", 3);
        assert_eq!(data.package_path, "com/example/shop");
        assert_eq!(data.project_name, "Shop");
        assert_eq!(data.app_name, "shop");
        assert_eq!(data.namespace, "Com.Example.Shop");
    }

    #[test]
    fn test_every_framework_renders() {
        for framework in Framework::ALL {
            let files = render(framework);
            assert!(!files.is_empty());
            assert!(files.iter().all(|f| !f.relative_path.contains("{{")));
        }
    }

    #[test]
    fn test_spring_application_path() {
        let files = render(Framework::SpringBoot);
        let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "pom.xml",
                "src/main/java/com/example/shop/Application.java",
                "src/main/resources/application.yml"
            ]
        );
        let app = content(&files, "src/main/java/com/example/shop/Application.java");
        assert!(app.starts_with("package com.example.shop;\n"));
        assert!(content(&files, "pom.xml").contains("<groupId>com.example.shop</groupId>"));
        assert_eq!(files[0].language, Language::Xml);
        assert_eq!(files[2].language, Language::Yaml);
    }

    #[test]
    fn test_django_wires_app() {
        let files = render(Framework::Django);
        assert!(content(&files, "config/settings.py").contains("    'shop',\n"));
        assert!(content(&files, "config/urls.py").contains("include('shop.urls')"));
        assert!(content(&files, "shop/apps.py").contains("class ShopConfig(AppConfig):"));
        assert_eq!(content(&files, "shop/__init__.py"), "");
    }

    #[test]
    fn test_dotnet_project_file() {
        let files = render(Framework::Dotnet);
        let csproj = content(&files, "Shop.csproj");
        assert!(csproj.contains("<RootNamespace>Com.Example.Shop</RootNamespace>"));
        let program = content(&files, "Program.cs");
        assert!(program.contains("using Com.Example.Shop.Extensions;"));
        assert!(program.contains("builder.Services.AddDomainServices();"));
    }

    #[test]
    fn test_express_template_literal_survives() {
        let files = render(Framework::Express);
        let app = content(&files, "src/app.js");
        assert!(app.contains("`Shop listening on port ${port}`"));
        assert_eq!(files[0].language, Language::Json);
        assert_eq!(files[3].relative_path, ".env.example");
        assert_eq!(files[3].language, Language::Text);
    }
}
